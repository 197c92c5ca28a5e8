use crate::dialect::bpmn::{BpmnModel, FlowElementKind, Process};
use crate::dialect::{Bounds, Point};
use crate::domain::ports::LayoutEngine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const POOL_PADDING: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub task_width: f64,
    pub task_height: f64,
    pub event_size: f64,
    pub gateway_size: f64,
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            task_width: 100.0,
            task_height: 80.0,
            event_size: 30.0,
            gateway_size: 40.0,
            horizontal_gap: 50.0,
            vertical_gap: 40.0,
        }
    }
}

/// Left-to-right layout: nodes are layered by their longest distance from a
/// source over sequence flows, one pool per process, pools stacked top to
/// bottom.
#[derive(Debug, Clone, Default)]
pub struct FlowLayout {
    settings: LayoutSettings,
}

impl FlowLayout {
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    fn node_size(&self, kind: &FlowElementKind) -> (f64, f64) {
        let s = &self.settings;
        match kind {
            FlowElementKind::StartEvent | FlowElementKind::EndEvent => (s.event_size, s.event_size),
            FlowElementKind::ExclusiveGateway
            | FlowElementKind::ParallelGateway
            | FlowElementKind::InclusiveGateway => (s.gateway_size, s.gateway_size),
            _ => (s.task_width, s.task_height),
        }
    }

    fn column_width(&self) -> f64 {
        self.settings.task_width + self.settings.horizontal_gap
    }

    fn row_height(&self) -> f64 {
        self.settings.task_height + self.settings.vertical_gap
    }

    /// Lays out one process with its pool's top edge at `top`; returns the
    /// pool bounds.
    fn layout_process(&self, model: &mut BpmnModel, process: &Process, top: f64) -> Bounds {
        let layers = assign_layers(process);
        let mut rows_per_layer: HashMap<usize, usize> = HashMap::new();
        let mut max_layer = 0;
        let mut max_rows = 0;

        for node in process.nodes() {
            let layer = layers.get(node.id.as_str()).copied().unwrap_or(0);
            let row = rows_per_layer.entry(layer).or_insert(0);
            let (width, height) = self.node_size(&node.kind);

            let cell_x = POOL_PADDING + layer as f64 * self.column_width();
            let cell_y = top + POOL_PADDING + *row as f64 * self.row_height();
            let bounds = Bounds::new(
                cell_x + (self.settings.task_width - width) / 2.0,
                cell_y + (self.settings.task_height - height) / 2.0,
                width,
                height,
            );
            model.location_map.insert(node.id.clone(), bounds);

            *row += 1;
            max_layer = max_layer.max(layer);
            max_rows = max_rows.max(*row);
        }

        let columns = (max_layer + 1) as f64;
        let rows = max_rows.max(1) as f64;
        let pool = Bounds::new(
            0.0,
            top,
            2.0 * POOL_PADDING + columns * self.column_width() - self.settings.horizontal_gap,
            2.0 * POOL_PADDING + rows * self.row_height() - self.settings.vertical_gap,
        );
        model.location_map.insert(process.id.clone(), pool);

        for (flow, source, target) in process.flows() {
            let (Some(from), Some(to)) = (
                model.location_map.get(source).copied(),
                model.location_map.get(target).copied(),
            ) else {
                continue;
            };
            model
                .flow_locations
                .insert(flow.id.clone(), route(&from, &to, pool.y + pool.height));
        }

        pool
    }
}

impl LayoutEngine for FlowLayout {
    fn layout(&self, mut model: BpmnModel) -> BpmnModel {
        let processes = model.processes.clone();
        let mut top = 0.0;
        for process in &processes {
            let pool = self.layout_process(&mut model, process, top);
            top = pool.y + pool.height + self.settings.vertical_gap;
        }
        tracing::debug!(
            "Generated layout for {} process(es), {} shapes",
            processes.len(),
            model.location_map.len()
        );
        model
    }
}

/// Longest-path layering. Cycles are cut by capping the layer at the node
/// count, so back edges cannot push a node forever.
fn assign_layers(process: &Process) -> HashMap<&str, usize> {
    let mut layers: HashMap<&str, usize> = process.nodes().map(|node| (node.id.as_str(), 0)).collect();
    let cap = layers.len().saturating_sub(1);
    let edges: Vec<(&str, &str)> = process
        .flows()
        .filter(|(_, source, target)| layers.contains_key(source) && layers.contains_key(target))
        .map(|(_, source, target)| (source, target))
        .collect();

    for _ in 0..layers.len() {
        let mut changed = false;
        for (source, target) in &edges {
            let candidate = (layers[source] + 1).min(cap);
            if candidate > layers[target] {
                layers.insert(*target, candidate);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    layers
}

fn route(from: &Bounds, to: &Bounds, below: f64) -> Vec<Point> {
    let (from_center, to_center) = (from.center(), to.center());
    if to.x >= from.x + from.width {
        return vec![
            Point {
                x: from.x + from.width,
                y: from_center.y,
            },
            Point {
                x: to.x,
                y: to_center.y,
            },
        ];
    }

    // Back edge: leave through the bottom and come back underneath.
    let lane = below - POOL_PADDING / 2.0;
    vec![
        Point {
            x: from_center.x,
            y: from.y + from.height,
        },
        Point {
            x: from_center.x,
            y: lane,
        },
        Point {
            x: to_center.x,
            y: lane,
        },
        Point {
            x: to_center.x,
            y: to.y + to.height,
        },
    ]
}
