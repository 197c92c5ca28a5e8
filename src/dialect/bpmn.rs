//! Process dialect (BPMN 2.0 subset).

use super::xml::{self, XmlElement};
use super::{LocationMap, ParseError, Point};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct BpmnModel {
    pub target_namespace: Option<String>,
    pub processes: Vec<Process>,
    pub location_map: LocationMap,
    pub flow_locations: IndexMap<String, Vec<Point>>,
}

#[derive(Debug, Clone)]
pub struct Process {
    pub id: String,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub executable: bool,
    pub flow_elements: Vec<FlowElement>,
}

#[derive(Debug, Clone)]
pub struct FlowElement {
    pub id: String,
    pub name: Option<String>,
    pub kind: FlowElementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowElementKind {
    StartEvent,
    EndEvent,
    UserTask,
    ServiceTask,
    ScriptTask,
    Task,
    ExclusiveGateway,
    ParallelGateway,
    InclusiveGateway,
    SequenceFlow {
        source_ref: String,
        target_ref: String,
        condition: Option<String>,
    },
}

impl FlowElementKind {
    fn from_element(element: &XmlElement) -> Result<Option<Self>, ParseError> {
        let kind = match element.name.as_str() {
            "startEvent" => Self::StartEvent,
            "endEvent" => Self::EndEvent,
            "userTask" => Self::UserTask,
            "serviceTask" => Self::ServiceTask,
            "scriptTask" => Self::ScriptTask,
            "task" => Self::Task,
            "exclusiveGateway" => Self::ExclusiveGateway,
            "parallelGateway" => Self::ParallelGateway,
            "inclusiveGateway" => Self::InclusiveGateway,
            "sequenceFlow" => Self::SequenceFlow {
                source_ref: element.required_attr("sourceRef")?,
                target_ref: element.required_attr("targetRef")?,
                condition: element.child_text("conditionExpression"),
            },
            _ => return Ok(None),
        };
        Ok(Some(kind))
    }

    /// Editor stencil id used in the canonical JSON.
    pub fn stencil_id(&self) -> &'static str {
        match self {
            Self::StartEvent => "StartNoneEvent",
            Self::EndEvent => "EndNoneEvent",
            Self::UserTask => "UserTask",
            Self::ServiceTask => "ServiceTask",
            Self::ScriptTask => "ScriptTask",
            Self::Task => "Task",
            Self::ExclusiveGateway => "ExclusiveGateway",
            Self::ParallelGateway => "ParallelGateway",
            Self::InclusiveGateway => "InclusiveGateway",
            Self::SequenceFlow { .. } => "SequenceFlow",
        }
    }

    pub fn is_flow(&self) -> bool {
        matches!(self, Self::SequenceFlow { .. })
    }
}

impl BpmnModel {
    /// The process the model is keyed by: the first one declared.
    pub fn main_process(&self) -> Option<&Process> {
        self.processes.first()
    }
}

impl Process {
    pub fn nodes(&self) -> impl Iterator<Item = &FlowElement> {
        self.flow_elements.iter().filter(|element| !element.kind.is_flow())
    }

    pub fn flows(&self) -> impl Iterator<Item = (&FlowElement, &str, &str)> {
        self.flow_elements.iter().filter_map(|element| match &element.kind {
            FlowElementKind::SequenceFlow {
                source_ref,
                target_ref,
                ..
            } => Some((element, source_ref.as_str(), target_ref.as_str())),
            _ => None,
        })
    }
}

pub fn parse(bytes: &[u8]) -> Result<BpmnModel, ParseError> {
    let root = xml::parse_document(bytes)?;
    if root.name != "definitions" {
        return Err(ParseError::UnexpectedRoot {
            expected: "definitions",
            found: root.name,
        });
    }

    let processes = root
        .children_named("process")
        .map(parse_process)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BpmnModel {
        target_namespace: root.non_empty_attr("targetNamespace"),
        processes,
        location_map: xml::collect_shapes(&root, "BPMNShape", "bpmnElement")?,
        flow_locations: xml::collect_edges(&root, "BPMNEdge", "bpmnElement")?,
    })
}

fn parse_process(element: &XmlElement) -> Result<Process, ParseError> {
    let mut flow_elements = Vec::new();
    for child in &element.children {
        if let Some(kind) = FlowElementKind::from_element(child)? {
            flow_elements.push(FlowElement {
                id: child.required_attr("id")?,
                name: child.non_empty_attr("name"),
                kind,
            });
        }
    }

    Ok(Process {
        id: element.required_attr("id")?,
        name: element.non_empty_attr("name"),
        documentation: element.child_text("documentation"),
        executable: element.attr("isExecutable") != Some("false"),
        flow_elements,
    })
}
