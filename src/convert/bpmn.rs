use super::{bounds_json, diagram_bounds, stencil, waypoint_bounds};
use crate::dialect::bpmn::{BpmnModel, FlowElement, FlowElementKind, Process};
use crate::dialect::Bounds;
use serde_json::{json, Value};

pub fn to_json(model: &BpmnModel) -> Value {
    let main = model.main_process();

    let child_shapes: Vec<Value> = match model.processes.as_slice() {
        [single] => process_shapes(model, single),
        processes => processes
            .iter()
            .map(|process| pool_shape(model, process))
            .collect(),
    };

    json!({
        "resourceId": "canvas",
        "bounds": bounds_json(&diagram_bounds(model.location_map.values())),
        "properties": {
            "process_id": main.map(|p| p.id.clone()).unwrap_or_default(),
            "name": main.and_then(|p| p.name.clone()).unwrap_or_default(),
            "documentation": main.and_then(|p| p.documentation.clone()).unwrap_or_default(),
            "process_namespace": model.target_namespace,
            "isexecutable": main.map(|p| p.executable).unwrap_or(true),
        },
        "stencil": stencil("BPMNDiagram"),
        "stencilset": {
            "namespace": "http://b3mn.org/stencilset/bpmn2.0#",
            "url": "../editor/stencilsets/bpmn2.0/bpmn2.0.json",
        },
        "childShapes": child_shapes,
    })
}

fn pool_shape(model: &BpmnModel, process: &Process) -> Value {
    let bounds = model.location_map.get(&process.id).copied().unwrap_or_else(|| {
        diagram_bounds(
            process
                .nodes()
                .filter_map(|node| model.location_map.get(&node.id)),
        )
    });

    json!({
        "resourceId": process.id,
        "stencil": stencil("Pool"),
        "properties": {
            "overrideid": process.id,
            "name": process.name.clone().unwrap_or_default(),
            "process_id": process.id,
            "documentation": process.documentation.clone().unwrap_or_default(),
        },
        "bounds": bounds_json(&bounds),
        "childShapes": process_shapes(model, process),
        "outgoing": [],
    })
}

fn process_shapes(model: &BpmnModel, process: &Process) -> Vec<Value> {
    let mut shapes: Vec<Value> = process
        .nodes()
        .map(|node| node_shape(model, process, node))
        .collect();
    shapes.extend(
        process
            .flows()
            .map(|(flow, _, target)| flow_shape(model, flow, target)),
    );
    shapes
}

fn node_shape(model: &BpmnModel, process: &Process, node: &FlowElement) -> Value {
    let bounds = model
        .location_map
        .get(&node.id)
        .copied()
        .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0));
    let outgoing: Vec<Value> = process
        .flows()
        .filter(|(_, source, _)| *source == node.id)
        .map(|(flow, _, _)| json!({ "resourceId": flow.id }))
        .collect();

    json!({
        "resourceId": node.id,
        "stencil": stencil(node.kind.stencil_id()),
        "properties": {
            "overrideid": node.id,
            "name": node.name.clone().unwrap_or_default(),
        },
        "bounds": bounds_json(&bounds),
        "childShapes": [],
        "outgoing": outgoing,
    })
}

fn flow_shape(model: &BpmnModel, flow: &FlowElement, target: &str) -> Value {
    let waypoints = model
        .flow_locations
        .get(&flow.id)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let condition = match &flow.kind {
        FlowElementKind::SequenceFlow { condition, .. } => condition.clone(),
        _ => None,
    };
    let dockers: Vec<Value> = waypoints
        .iter()
        .map(|point| json!({ "x": point.x, "y": point.y }))
        .collect();

    json!({
        "resourceId": flow.id,
        "stencil": stencil("SequenceFlow"),
        "properties": {
            "overrideid": flow.id,
            "name": flow.name.clone().unwrap_or_default(),
            "conditionsequenceflow": condition.unwrap_or_default(),
        },
        "bounds": bounds_json(&waypoint_bounds(waypoints)),
        "dockers": dockers,
        "outgoing": [{ "resourceId": target }],
        "target": { "resourceId": target },
        "childShapes": [],
    })
}
