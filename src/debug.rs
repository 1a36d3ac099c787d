//! Debug outline generation.
//!
//! Produces closed world-space polylines for collider shapes so an embedding
//! application can draw collision geometry. Shapes without outline support are
//! logged once per call and skipped; they never abort the step.

use std::f32::consts::PI;

use rapier2d::parry::shape::{Capsule, Shape, TypedShape};
use rapier2d::prelude::*;

use crate::settings::OUTLINE_CIRCLE_SEGMENTS;

/// Closed outline of a collider in world space.
///
/// Returns `None` (after a logged warning) for shapes without outline support.
pub fn collider_outline(collider: &Collider) -> Option<Vec<Point<f32>>> {
    let local = shape_outline(collider.shape())?;
    let pose = collider.position();
    Some(local.iter().map(|p| pose * p).collect())
}

/// Closed outline of a shape in its local space.
pub fn shape_outline(shape: &dyn Shape) -> Option<Vec<Point<f32>>> {
    match shape.as_typed_shape() {
        TypedShape::Ball(ball) => Some(circle(Point::origin(), ball.radius)),
        TypedShape::Cuboid(cuboid) => {
            let he = cuboid.half_extents;
            Some(vec![
                Point::new(-he.x, -he.y),
                Point::new(he.x, -he.y),
                Point::new(he.x, he.y),
                Point::new(-he.x, he.y),
                Point::new(-he.x, -he.y),
            ])
        }
        TypedShape::Capsule(capsule) => Some(capsule_outline(capsule)),
        _ => {
            log::warn!(
                "no debug outline for shape type {:?}; skipping",
                shape.shape_type()
            );
            None
        }
    }
}

fn circle(center: Point<f32>, radius: f32) -> Vec<Point<f32>> {
    let n = OUTLINE_CIRCLE_SEGMENTS;
    let mut points: Vec<Point<f32>> = (0..n)
        .map(|i| {
            let angle = (i as f32) / (n as f32) * 2.0 * PI;
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect();
    // Repeat the first point so the loop closes exactly.
    points.push(points[0]);
    points
}

/// Stadium outline: two straight sides plus a half-circle cap around each
/// segment endpoint.
fn capsule_outline(capsule: &Capsule) -> Vec<Point<f32>> {
    let a = capsule.segment.a;
    let b = capsule.segment.b;
    let r = capsule.radius;

    let axis = b - a;
    if axis.norm() < 1.0e-6 {
        // Degenerate capsule is just a ball.
        return circle(a, r);
    }
    let t = axis.normalize();
    // Angle of the axis normal (t rotated +90 degrees): the sweep start.
    let base = t.x.atan2(-t.y);

    let half = OUTLINE_CIRCLE_SEGMENTS / 2;
    let mut points = Vec::with_capacity((OUTLINE_CIRCLE_SEGMENTS + 3) as usize);

    // Cap around `b`, sweeping from +normal through +axis to -normal.
    for i in 0..=half {
        let angle = base - PI * (i as f32) / (half as f32);
        points.push(Point::new(
            b.x + r * angle.cos(),
            b.y + r * angle.sin(),
        ));
    }
    // Cap around `a`, continuing the sweep back to +normal.
    for i in 0..=half {
        let angle = base - PI - PI * (i as f32) / (half as f32);
        points.push(Point::new(
            a.x + r * angle.cos(),
            a.y + r * angle.sin(),
        ));
    }
    // Close the loop.
    points.push(points[0]);
    points
}
