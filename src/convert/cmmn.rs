use super::{bounds_json, diagram_bounds, stencil};
use crate::dialect::cmmn::{CmmnModel, PlanItem, PlanItemKind, Stage};
use crate::dialect::{Bounds, LocationMap};
use serde_json::{json, Value};

pub fn to_json(model: &CmmnModel) -> Value {
    let primary = model.primary_case();
    let child_shapes: Vec<Value> = primary
        .map(|case| vec![plan_model_shape(&model.location_map, &case.plan_model)])
        .unwrap_or_default();

    json!({
        "resourceId": "canvas",
        "bounds": bounds_json(&diagram_bounds(model.location_map.values())),
        "properties": {
            "case_id": primary.map(|c| c.id.clone()).unwrap_or_default(),
            "name": primary.and_then(|c| c.name.clone()).unwrap_or_default(),
            "documentation": primary.and_then(|c| c.documentation.clone()).unwrap_or_default(),
            "case_namespace": model.target_namespace,
        },
        "stencil": stencil("CMMNDiagram"),
        "stencilset": {
            "namespace": "http://b3mn.org/stencilset/cmmn1.1#",
            "url": "../editor/stencilsets/cmmn1.1/cmmn1.1.json",
        },
        "childShapes": child_shapes,
    })
}

fn location(locations: &LocationMap, id: &str) -> Bounds {
    locations
        .get(id)
        .copied()
        .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0))
}

fn plan_model_shape(locations: &LocationMap, plan_model: &Stage) -> Value {
    json!({
        "resourceId": plan_model.id,
        "stencil": stencil("CasePlanModel"),
        "properties": {
            "overrideid": plan_model.id,
            "name": plan_model.name.clone().unwrap_or_default(),
            "autocompleteenabled": plan_model.auto_complete,
        },
        "bounds": bounds_json(&location(locations, &plan_model.id)),
        "childShapes": stage_children(locations, plan_model),
        "outgoing": [],
    })
}

fn stage_children(locations: &LocationMap, stage: &Stage) -> Vec<Value> {
    stage
        .plan_items
        .iter()
        .map(|item| plan_item_shape(locations, item))
        .collect()
}

fn plan_item_shape(locations: &LocationMap, item: &PlanItem) -> Value {
    let children = match &item.kind {
        PlanItemKind::Stage(stage) => stage_children(locations, stage),
        _ => Vec::new(),
    };

    json!({
        "resourceId": item.id,
        "stencil": stencil(item.kind.stencil_id()),
        "properties": {
            "overrideid": item.definition_id,
            "name": item.name.clone().unwrap_or_default(),
        },
        "bounds": bounds_json(&location(locations, &item.id)),
        "childShapes": children,
        "outgoing": [],
    })
}
