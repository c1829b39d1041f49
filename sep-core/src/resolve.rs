//! Splitting an overlap into equal and opposite nudges.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::types::Node;

/// Unit vector from `b`'s home to `a`'s home.
///
/// Coincident homes have no direction; a uniformly random one is drawn from
/// `rng` so that such pairs still come apart.
pub fn home_direction(a: &Node, b: &Node, rng: &mut impl Rng) -> Vec2 {
    let v = a.home - b.home;
    let len = v.length();
    if len > 0.0 {
        v / len
    } else {
        let phi = rng.random_range(0.0..TAU);
        Vec2::new(phi.cos(), phi.sin())
    }
}

/// Displacement to apply to `a` (and, negated, to `b`).
///
/// ### Parameters
/// - `overlap` - Rectangle-equivalent penetration of the pair, both axes `> 0`.
/// - `dir` - Unit home direction from [`home_direction`].
/// - `alpha` - Current decay of the host simulation.
/// - `conformity` - Blend in `[0, 1]`; `1.0` pushes purely along `dir`.
///
/// ### Returns
/// `shift * dir` for full conformity. Otherwise the axis with the larger
/// overlap keeps `dir`'s component scaled by `conformity`, and the other
/// axis is pushed toward a full-strength, sign-only move so the pair ends
/// up side by side instead of sliding diagonally.
pub fn displacement(overlap: Vec2, dir: Vec2, alpha: f32, conformity: f32) -> Vec2 {
    let shift = (overlap.x * overlap.y).sqrt() * alpha;

    if conformity == 1.0 {
        return dir * shift;
    }

    let sign = |v: f32| if v > 0.0 { 1.0 } else { -1.0 };
    let compact = |v: f32| shift * (sign(v) * (1.0 - conformity) + v * (1.0 + conformity)) / 2.0;

    if overlap.x > overlap.y {
        Vec2::new(shift * dir.x * conformity, compact(dir.y))
    } else {
        Vec2::new(compact(dir.x), shift * dir.y * conformity)
    }
}

/// Pushes `a` and `b` apart by the resolved displacement.
///
/// The move is zero-sum: whatever `a` gains, `b` loses. Returns the
/// displacement applied to `a`.
pub fn separate(
    a: &mut Node,
    b: &mut Node,
    overlap: Vec2,
    alpha: f32,
    conformity: f32,
    rng: &mut impl Rng,
) -> Vec2 {
    let dir = home_direction(a, b, rng);
    let shift = displacement(overlap, dir, alpha, conformity);
    a.pos += shift;
    b.pos -= shift;
    shift
}
