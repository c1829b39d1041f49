//! Pairwise overlap tests for the two supported shapes.
//!
//! Both tests answer with the penetration of the pair expressed per axis, as
//! if the overlap area were a rectangle; the resolver only ever sees that
//! rectangle-equivalent amount.

use glam::Vec2;

use crate::{config::Shape, types::Node};

/// Overlap found between two nodes.
///
/// ### Fields
/// - `overlap` - Penetration along x and y, both strictly positive.
/// - `swapped` - `true` if the test reordered the pair (the ellipse test
///   centres on the larger shape); the resolver must then be called as
///   `(b, a)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub overlap: Vec2,
    pub swapped: bool,
}

/// Length of the intersection of `[a_lo, a_hi]` and `[b_lo, b_hi]`;
/// negative values are the gap between them.
#[inline]
pub fn axis_overlap(a_lo: f32, a_hi: f32, b_lo: f32, b_hi: f32) -> f32 {
    a_hi.min(b_hi) - a_lo.max(b_lo)
}

/// Per-axis overlap between a node's box and an axis-aligned region.
pub fn box_region_overlap(node: &Node, min: Vec2, max: Vec2) -> Vec2 {
    let h = node.half_extents();
    Vec2::new(
        axis_overlap(node.pos.x - h.x, node.pos.x + h.x, min.x, max.x),
        axis_overlap(node.pos.y - h.y, node.pos.y + h.y, min.y, max.y),
    )
}

/// Runs the overlap test selected by `shape`.
pub fn overlap(shape: Shape, a: &Node, b: &Node, padding: f32) -> Option<Contact> {
    match shape {
        Shape::Rectangle => rect_overlap(a, b, padding).map(|overlap| Contact {
            overlap,
            swapped: false,
        }),
        Shape::Ellipse => ellipse_overlap(a, b, padding),
    }
}

/// Padded overlap of two axis-aligned boxes.
///
/// Returns `None` unless both axes overlap strictly.
pub fn rect_overlap(a: &Node, b: &Node, padding: f32) -> Option<Vec2> {
    let ha = a.half_extents();
    let hb = b.half_extents();

    let ox = padding
        + axis_overlap(
            a.pos.x - ha.x,
            a.pos.x + ha.x,
            b.pos.x - hb.x,
            b.pos.x + hb.x,
        );
    let oy = padding
        + axis_overlap(
            a.pos.y - ha.y,
            a.pos.y + ha.y,
            b.pos.y - hb.y,
            b.pos.y + hb.y,
        );

    (ox > 0.0 && oy > 0.0).then_some(Vec2::new(ox, oy))
}

/// Padded overlap of two axis-aligned ellipses.
///
/// The smaller ellipse is scaled onto the unit circle and the larger one,
/// grown by the padding and by that unit radius, becomes an ellipse with
/// radii `(rx, ry)` around the origin. The overlap is the amount by which
/// the scaled centre offset `(x, y)` falls inside it.
pub fn ellipse_overlap(a: &Node, b: &Node, padding: f32) -> Option<Contact> {
    let swapped = a.area() < b.area();
    let (big, small) = if swapped { (b, a) } else { (a, b) };

    let rx = (2.0 * padding + big.size.x) / small.size.x + 1.0;
    let ry = (2.0 * padding + big.size.y) / small.size.y + 1.0;
    let x = (small.pos.x - big.pos.x) * 2.0 / small.size.x;
    let y = (small.pos.y - big.pos.y) * 2.0 / small.size.y;

    let (rx2, ry2) = (rx * rx, ry * ry);
    let olap = rx2 * ry2 - ry2 * x * x - rx2 * y * y;
    if !(olap > 0.0) {
        return None;
    }

    // Gradient of the implicit boundary at the offset point.
    let gx = ry2 * x;
    let gy = rx2 * y;
    let g = (gx * gx + gy * gy).sqrt();

    // Near the centre the gradient estimate blows up; no exit is farther
    // than the larger radius.
    let (dir, depth) = if g > 0.0 {
        let depth = (0.5 * olap / g).min(rx.max(ry));
        (Vec2::new((gx / g).abs(), (gy / g).abs()), depth)
    } else {
        // Concentric: leave along the axis with the shorter way out.
        tracing::trace!(rx, ry, "concentric ellipses, using axis fallback");
        if rx <= ry {
            (Vec2::X, rx)
        } else {
            (Vec2::Y, ry)
        }
    };

    let width = if depth > 1.0 {
        2.0
    } else {
        2.0 * (depth * (2.0 - depth)).sqrt()
    };

    let unit = Vec2::new(
        (depth * dir.x).max(width * dir.y),
        (depth * dir.y).max(width * dir.x),
    );

    Some(Contact {
        overlap: unit * small.half_extents(),
        swapped,
    })
}
