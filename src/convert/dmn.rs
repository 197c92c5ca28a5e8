use super::context::ConversionContext;
use super::{bounds_json, diagram_bounds, stencil};
use crate::dialect::dmn::{Decision, DecisionService, DmnDefinition};
use crate::dialect::{Bounds, LocationMap};
use crate::utils::error::{ImportError, Result};
use serde_json::{json, Map, Value};

/// Standalone decision-table document for one decision, in the pre-versioned
/// layout that schema migration upgrades.
pub fn decision_table_to_json(decision: &Decision, model_id: &str, name: Option<&str>) -> Value {
    let mut input_expressions = Vec::new();
    let mut output_expressions = Vec::new();
    let mut rules = Vec::new();
    let mut hit_indicator = "UNIQUE".to_string();
    let mut collect_operator = None;

    if let Some(table) = &decision.table {
        hit_indicator = table.hit_policy.clone();
        collect_operator = table.aggregation.clone();

        input_expressions = table
            .inputs
            .iter()
            .map(|input| {
                json!({
                    "id": input.id,
                    "label": input.label.clone().unwrap_or_default(),
                    "variableId": input.expression.clone().unwrap_or_default(),
                    "type": input.type_ref.clone().unwrap_or_default(),
                })
            })
            .collect();
        output_expressions = table
            .outputs
            .iter()
            .map(|output| {
                json!({
                    "id": output.id,
                    "label": output.label.clone().unwrap_or_default(),
                    "variableId": output.name.clone().unwrap_or_default(),
                    "type": output.type_ref.clone().unwrap_or_default(),
                })
            })
            .collect();

        for rule in &table.rules {
            let mut entries = Map::new();
            for (index, input) in table.inputs.iter().enumerate() {
                let entry = rule.input_entries.get(index).map(String::as_str).unwrap_or("-");
                entries.insert(input.id.clone(), Value::String(entry.to_string()));
            }
            for (index, output) in table.outputs.iter().enumerate() {
                let entry = rule.output_entries.get(index).cloned().unwrap_or_default();
                entries.insert(output.id.clone(), Value::String(entry));
            }
            if let Some(description) = &rule.description {
                entries.insert("description".to_string(), Value::String(description.clone()));
            }
            rules.push(Value::Object(entries));
        }
    }

    json!({
        "id": model_id,
        "key": decision.id,
        "name": name.unwrap_or(decision.id.as_str()),
        "description": decision.description,
        "hitIndicator": hit_indicator,
        "collectOperator": collect_operator,
        "inputExpressions": input_expressions,
        "outputExpressions": output_expressions,
        "rules": rules,
    })
}

/// Decision-service document whose decisions point at persisted decision
/// tables. Every referenced decision must already be in `context`.
pub fn decision_service_to_json(
    definition: &DmnDefinition,
    context: &ConversionContext,
) -> Result<Value> {
    let services = definition
        .decision_services
        .iter()
        .map(|service| decision_service_shape(definition, service, context))
        .collect::<Result<Vec<_>>>()?;

    let primary = definition.primary_decision_service();
    Ok(json!({
        "resourceId": "canvas",
        "bounds": bounds_json(&diagram_bounds(definition.location_map.values())),
        "properties": {
            "drd_id": definition.id.clone().unwrap_or_default(),
            "name": definition.name.clone().unwrap_or_default(),
            "namespace": definition.namespace,
            "documentation": primary.and_then(|s| s.description.clone()).unwrap_or_default(),
        },
        "stencil": stencil("DMNDiagram"),
        "stencilset": {
            "namespace": "http://b3mn.org/stencilset/dmn1.2#",
            "url": "../editor/stencilsets/dmn1.2/dmn1.2.json",
        },
        "childShapes": services,
    }))
}

fn location(locations: &LocationMap, id: &str) -> Bounds {
    locations
        .get(id)
        .copied()
        .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0))
}

fn decision_service_shape(
    definition: &DmnDefinition,
    service: &DecisionService,
    context: &ConversionContext,
) -> Result<Value> {
    let sections = service
        .output_decisions
        .iter()
        .map(|id| (id, "output"))
        .chain(
            service
                .encapsulated_decisions
                .iter()
                .map(|id| (id, "encapsulated")),
        );

    let mut decisions = Vec::new();
    for (local_id, section) in sections {
        let reference = context.decision_table(local_id).ok_or_else(|| {
            ImportError::UnresolvedDecisionTable {
                local_id: local_id.clone(),
            }
        })?;
        let name = definition
            .decision(local_id)
            .and_then(|decision| decision.name.clone())
            .unwrap_or_else(|| reference.name.clone());

        decisions.push(json!({
            "resourceId": local_id,
            "stencil": stencil("Decision"),
            "properties": {
                "overrideid": local_id,
                "name": name,
                "section": section,
                "decisiontablereference": {
                    "id": reference.id,
                    "key": reference.key,
                    "name": reference.name,
                },
            },
            "bounds": bounds_json(&location(&definition.location_map, local_id)),
            "childShapes": [],
            "outgoing": [],
        }));
    }

    Ok(json!({
        "resourceId": service.id,
        "stencil": stencil("DecisionService"),
        "properties": {
            "overrideid": service.id,
            "name": service.name.clone().unwrap_or_default(),
            "documentation": service.description.clone().unwrap_or_default(),
        },
        "bounds": bounds_json(&location(&definition.location_map, &service.id)),
        "childShapes": decisions,
        "outgoing": [],
    }))
}
