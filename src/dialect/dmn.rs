//! Decision-service dialect (DMN 1.3 subset).

use super::xml::{self, XmlElement};
use super::{LocationMap, ParseError};

#[derive(Debug, Clone, Default)]
pub struct DmnDefinition {
    pub id: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub decisions: Vec<Decision>,
    pub decision_services: Vec<DecisionService>,
    pub location_map: LocationMap,
}

#[derive(Debug, Clone)]
pub struct Decision {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub table: Option<DecisionTable>,
}

#[derive(Debug, Clone)]
pub struct DecisionTable {
    pub id: Option<String>,
    pub hit_policy: String,
    pub aggregation: Option<String>,
    pub inputs: Vec<InputClause>,
    pub outputs: Vec<OutputClause>,
    pub rules: Vec<DecisionRule>,
}

#[derive(Debug, Clone)]
pub struct InputClause {
    pub id: String,
    pub label: Option<String>,
    pub expression: Option<String>,
    pub type_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OutputClause {
    pub id: String,
    pub label: Option<String>,
    pub name: Option<String>,
    pub type_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DecisionRule {
    pub id: Option<String>,
    pub description: Option<String>,
    pub input_entries: Vec<String>,
    pub output_entries: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DecisionService {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Local ids of the decisions the service exposes.
    pub output_decisions: Vec<String>,
    /// Local ids of the decisions hidden inside the service.
    pub encapsulated_decisions: Vec<String>,
}

impl DmnDefinition {
    pub fn primary_decision_service(&self) -> Option<&DecisionService> {
        self.decision_services.first()
    }

    pub fn decision(&self, id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|decision| decision.id == id)
    }
}

pub fn parse(bytes: &[u8]) -> Result<DmnDefinition, ParseError> {
    let root = xml::parse_document(bytes)?;
    if root.name != "definitions" {
        return Err(ParseError::UnexpectedRoot {
            expected: "definitions",
            found: root.name,
        });
    }

    let decisions = root
        .children_named("decision")
        .map(parse_decision)
        .collect::<Result<Vec<_>, _>>()?;
    let decision_services = root
        .children_named("decisionService")
        .map(parse_decision_service)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DmnDefinition {
        id: root.non_empty_attr("id"),
        name: root.non_empty_attr("name"),
        namespace: root.non_empty_attr("namespace"),
        decisions,
        decision_services,
        location_map: xml::collect_shapes(&root, "DMNShape", "dmnElementRef")?,
    })
}

fn parse_decision(element: &XmlElement) -> Result<Decision, ParseError> {
    let table = element
        .child("decisionTable")
        .map(parse_decision_table)
        .transpose()?;

    Ok(Decision {
        id: element.required_attr("id")?,
        name: element.non_empty_attr("name"),
        description: element.child_text("description"),
        table,
    })
}

fn parse_decision_table(element: &XmlElement) -> Result<DecisionTable, ParseError> {
    let inputs = element
        .children_named("input")
        .map(|input| {
            let expression = input.child("inputExpression");
            Ok(InputClause {
                id: input.required_attr("id")?,
                label: input.non_empty_attr("label"),
                expression: expression.and_then(|e| e.child_text("text")),
                type_ref: expression.and_then(|e| e.non_empty_attr("typeRef")),
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    let outputs = element
        .children_named("output")
        .map(|output| {
            Ok(OutputClause {
                id: output.required_attr("id")?,
                label: output.non_empty_attr("label"),
                name: output.non_empty_attr("name"),
                type_ref: output.non_empty_attr("typeRef"),
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    let rules = element
        .children_named("rule")
        .map(|rule| DecisionRule {
            id: rule.non_empty_attr("id"),
            description: rule.child_text("description"),
            input_entries: rule
                .children_named("inputEntry")
                .map(|entry| entry.child_text("text").unwrap_or_default())
                .collect(),
            output_entries: rule
                .children_named("outputEntry")
                .map(|entry| entry.child_text("text").unwrap_or_default())
                .collect(),
        })
        .collect();

    Ok(DecisionTable {
        id: element.non_empty_attr("id"),
        hit_policy: element
            .non_empty_attr("hitPolicy")
            .unwrap_or_else(|| "UNIQUE".to_string()),
        aggregation: element.non_empty_attr("aggregation"),
        inputs,
        outputs,
        rules,
    })
}

fn parse_decision_service(element: &XmlElement) -> Result<DecisionService, ParseError> {
    let refs = |name: &str| -> Vec<String> {
        element
            .children_named(name)
            .filter_map(|reference| reference.non_empty_attr("href"))
            .map(|href| xml::local_ref(&href))
            .collect()
    };

    Ok(DecisionService {
        id: element.required_attr("id")?,
        name: element.non_empty_attr("name"),
        description: element.child_text("description"),
        output_decisions: refs("outputDecision"),
        encapsulated_decisions: refs("encapsulatedDecision"),
    })
}
