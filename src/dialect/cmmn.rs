//! Case dialect (CMMN 1.1 subset).

use super::xml::{self, XmlElement};
use super::{LocationMap, ParseError};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CmmnModel {
    pub target_namespace: Option<String>,
    pub cases: Vec<Case>,
    pub location_map: LocationMap,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub id: String,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub plan_model: Stage,
}

#[derive(Debug, Clone)]
pub struct Stage {
    pub id: String,
    pub name: Option<String>,
    pub auto_complete: bool,
    pub plan_items: Vec<PlanItem>,
}

/// A plan item resolved against the definition it references.
#[derive(Debug, Clone)]
pub struct PlanItem {
    pub id: String,
    pub definition_id: String,
    pub name: Option<String>,
    pub kind: PlanItemKind,
}

#[derive(Debug, Clone)]
pub enum PlanItemKind {
    Task,
    HumanTask,
    ProcessTask,
    CaseTask,
    DecisionTask,
    Milestone,
    TimerEventListener,
    UserEventListener,
    Stage(Stage),
}

impl PlanItemKind {
    pub fn stencil_id(&self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::HumanTask => "HumanTask",
            Self::ProcessTask => "ProcessTask",
            Self::CaseTask => "CaseTask",
            Self::DecisionTask => "DecisionTask",
            Self::Milestone => "Milestone",
            Self::TimerEventListener => "TimerEventListener",
            Self::UserEventListener => "UserEventListener",
            Self::Stage(_) => "Stage",
        }
    }
}

impl CmmnModel {
    pub fn primary_case(&self) -> Option<&Case> {
        self.cases.first()
    }
}

pub fn parse(bytes: &[u8]) -> Result<CmmnModel, ParseError> {
    let root = xml::parse_document(bytes)?;
    if root.name != "definitions" {
        return Err(ParseError::UnexpectedRoot {
            expected: "definitions",
            found: root.name,
        });
    }

    let cases = root
        .children_named("case")
        .map(parse_case)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CmmnModel {
        target_namespace: root.non_empty_attr("targetNamespace"),
        cases,
        location_map: xml::collect_shapes(&root, "CMMNShape", "cmmnElementRef")?,
    })
}

fn parse_case(element: &XmlElement) -> Result<Case, ParseError> {
    let plan_model = match element.child("casePlanModel") {
        Some(plan_model) => parse_stage(plan_model)?,
        None => Stage {
            id: format!("{}_planModel", element.required_attr("id")?),
            name: None,
            auto_complete: false,
            plan_items: Vec::new(),
        },
    };

    Ok(Case {
        id: element.required_attr("id")?,
        name: element.non_empty_attr("name"),
        documentation: element.child_text("documentation"),
        plan_model,
    })
}

fn parse_stage(element: &XmlElement) -> Result<Stage, ParseError> {
    let definitions: HashMap<&str, &XmlElement> = element
        .children
        .iter()
        .filter(|child| child.name != "planItem")
        .filter_map(|child| child.attr("id").map(|id| (id, child)))
        .collect();

    let mut plan_items = Vec::new();
    for plan_item in element.children_named("planItem") {
        let id = plan_item.required_attr("id")?;
        let definition_id = plan_item.required_attr("definitionRef")?;
        let definition = definitions.get(definition_id.as_str()).ok_or_else(|| {
            ParseError::UnknownDefinition {
                plan_item: id.clone(),
                definition: definition_id.clone(),
            }
        })?;

        let kind = match definition.name.as_str() {
            "humanTask" => PlanItemKind::HumanTask,
            "processTask" => PlanItemKind::ProcessTask,
            "caseTask" => PlanItemKind::CaseTask,
            "decisionTask" => PlanItemKind::DecisionTask,
            "milestone" => PlanItemKind::Milestone,
            "timerEventListener" => PlanItemKind::TimerEventListener,
            "userEventListener" => PlanItemKind::UserEventListener,
            "stage" => PlanItemKind::Stage(parse_stage(definition)?),
            _ => PlanItemKind::Task,
        };

        plan_items.push(PlanItem {
            name: plan_item
                .non_empty_attr("name")
                .or_else(|| definition.non_empty_attr("name")),
            id,
            definition_id,
            kind,
        });
    }

    Ok(Stage {
        id: element.required_attr("id")?,
        name: element.non_empty_attr("name"),
        auto_complete: element.attr("autoComplete") == Some("true"),
        plan_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLAIM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL"
             xmlns:cmmndi="http://www.omg.org/spec/CMMN/20151109/CMMNDI"
             xmlns:dc="http://www.omg.org/spec/CMMN/20151109/DC"
             targetNamespace="http://example.com/claims">
  <case id="claim" name="Claim">
    <documentation>Insurance claim</documentation>
    <casePlanModel id="planModel" name="Claim plan" autoComplete="true">
      <planItem id="pi_review" definitionRef="review"/>
      <planItem id="pi_stage" name="Payout" definitionRef="payout"/>
      <humanTask id="review" name="Review claim"/>
      <stage id="payout">
        <planItem id="pi_done" definitionRef="done"/>
        <milestone id="done" name="Paid"/>
      </stage>
    </casePlanModel>
  </case>
  <cmmndi:CMMNDI><cmmndi:CMMNDiagram id="d">
    <cmmndi:CMMNShape id="s1" cmmnElementRef="planModel"><dc:Bounds x="0" y="0" width="500" height="400"/></cmmndi:CMMNShape>
  </cmmndi:CMMNDiagram></cmmndi:CMMNDI>
</definitions>"#;

    #[test]
    fn test_parse_case_plan_model() {
        let model = parse(CLAIM.as_bytes()).unwrap();
        let case = model.primary_case().unwrap();
        assert_eq!(case.id, "claim");
        assert_eq!(case.documentation.as_deref(), Some("Insurance claim"));
        assert_eq!(case.plan_model.id, "planModel");
        assert!(case.plan_model.auto_complete);

        let items = &case.plan_model.plan_items;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0].kind, PlanItemKind::HumanTask));
        assert_eq!(items[0].name.as_deref(), Some("Review claim"));
        assert_eq!(items[1].name.as_deref(), Some("Payout"));

        let PlanItemKind::Stage(stage) = &items[1].kind else {
            panic!("expected a stage");
        };
        assert!(matches!(stage.plan_items[0].kind, PlanItemKind::Milestone));
        assert_eq!(model.location_map.len(), 1);
    }

    #[test]
    fn test_unknown_definition_reference() {
        let xml = r#"<definitions><case id="c"><casePlanModel id="pm">
            <planItem id="pi" definitionRef="missing"/>
        </casePlanModel></case></definitions>"#;
        assert!(matches!(
            parse(xml.as_bytes()),
            Err(ParseError::UnknownDefinition { .. })
        ));
    }

    #[test]
    fn test_definitions_without_cases() {
        let model = parse(b"<definitions/>").unwrap();
        assert!(model.cases.is_empty());
        assert!(model.location_map.is_empty());
    }
}
