//! Canonical JSON conversion for each dialect.

pub mod bpmn;
pub mod cmmn;
pub mod context;
pub mod dmn;
pub mod migration;

pub use context::{ConversionContext, DecisionTableReference};

use crate::dialect::{Bounds, Point};
use serde_json::{json, Value};

pub(crate) fn bounds_json(bounds: &Bounds) -> Value {
    let lower_right = bounds.lower_right();
    json!({
        "upperLeft": { "x": bounds.x, "y": bounds.y },
        "lowerRight": { "x": lower_right.x, "y": lower_right.y },
    })
}

/// Smallest rectangle holding every waypoint.
pub(crate) fn waypoint_bounds(points: &[Point]) -> Bounds {
    let Some(first) = points.first() else {
        return Bounds::new(0.0, 0.0, 0.0, 0.0);
    };
    let (mut min, mut max) = (*first, *first);
    for point in &points[1..] {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
    }
    Bounds::new(min.x, min.y, max.x - min.x, max.y - min.y)
}

/// Diagram extent: the union of every rectangle, anchored at the origin.
pub(crate) fn diagram_bounds<'a>(all: impl Iterator<Item = &'a Bounds>) -> Bounds {
    let (mut width, mut height) = (0.0_f64, 0.0_f64);
    for bounds in all {
        let lower_right = bounds.lower_right();
        width = width.max(lower_right.x);
        height = height.max(lower_right.y);
    }
    Bounds::new(0.0, 0.0, width, height)
}

pub(crate) fn stencil(id: &str) -> Value {
    json!({ "id": id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waypoint_bounds() {
        let points = [Point { x: 10.0, y: 40.0 }, Point { x: 60.0, y: 15.0 }];
        assert_eq!(waypoint_bounds(&points), Bounds::new(10.0, 15.0, 50.0, 25.0));
        assert_eq!(waypoint_bounds(&[]), Bounds::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_diagram_bounds_covers_all_shapes() {
        let shapes = [Bounds::new(0.0, 0.0, 30.0, 30.0), Bounds::new(100.0, 50.0, 100.0, 80.0)];
        assert_eq!(diagram_bounds(shapes.iter()), Bounds::new(0.0, 0.0, 200.0, 130.0));
    }

    #[test]
    fn test_bounds_json_shape() {
        let value = bounds_json(&Bounds::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(value["upperLeft"]["x"], 1.0);
        assert_eq!(value["lowerRight"]["y"], 6.0);
    }
}
