//! Per-tick walks over the node list.
//!
//! Each walk applies [`home_gravity`] to every node once and hands candidate
//! pairs `(a, b)` to a callback that may move both nodes. The walks are
//! strictly sequential: a pair test sees every correction made earlier in the
//! same tick, and the settled layout depends on that order. Do not split the
//! pair loop across threads without switching to a snapshot-then-apply
//! scheme first.

use glam::Vec2;

use crate::{
    config::Traversal,
    geometry::box_region_overlap,
    quadtree::Quadtree,
    types::{Node, NodeId},
};

/// Pulls a node toward its home position by the fraction `k`.
#[inline]
pub fn home_gravity(node: &mut Node, k: f32) {
    node.pos += (node.home - node.pos) * k;
}

/// Runs the walk selected by `traversal`.
///
/// ### Parameters
/// - `nodes` - Node list of the host, mutated in place.
/// - `k` - Home gravity fraction (`alpha * stickyness`).
/// - `reach` - Per-axis distance beyond a node's box at which partners may
///   still overlap it; only the quadtree walk uses it.
/// - `pair` - Called with the node list and two distinct indices.
pub fn walk(
    traversal: Traversal,
    nodes: &mut [Node],
    k: f32,
    reach: Vec2,
    pair: impl FnMut(&mut [Node], NodeId, NodeId),
) {
    match traversal {
        Traversal::Exhaustive => exhaustive(nodes, k, pair),
        Traversal::Quadtree => quadtree(nodes, k, reach, pair),
    }
}

/// Visits every unordered pair exactly once, as `(i, j)` with `i < j`.
pub fn exhaustive(nodes: &mut [Node], k: f32, mut pair: impl FnMut(&mut [Node], NodeId, NodeId)) {
    for a in 0..nodes.len() {
        home_gravity(&mut nodes[a], k);
        for b in a + 1..nodes.len() {
            pair(nodes, a, b);
        }
    }
}

/// Visits candidate pairs found through a quadtree over the node centres.
///
/// The tree is built once at the start of the walk. For each node `a`, a
/// cell is skipped when the gap between `a`'s box and the cell exceeds
/// `reach` on both axes. A pair may be handed out twice, once from each
/// side.
pub fn quadtree(
    nodes: &mut [Node],
    k: f32,
    reach: Vec2,
    mut pair: impl FnMut(&mut [Node], NodeId, NodeId),
) {
    let centres: Vec<Vec2> = nodes.iter().map(|n| n.pos).collect();
    let tree = Quadtree::from_points(&centres);

    for a in 0..nodes.len() {
        home_gravity(&mut nodes[a], k);
        tree.visit(|region, point| {
            if let Some(b) = point
                && b != a
            {
                pair(nodes, a, b);
            }
            let gap = -box_region_overlap(&nodes[a], region.min, region.max);
            gap.x > reach.x && gap.y > reach.y
        });
    }
}

/// Largest half-extent on each axis plus `padding`.
///
/// Regions farther than this from a node's box hold no centre whose shape
/// can touch it.
pub fn reach(nodes: &[Node], padding: f32) -> Vec2 {
    nodes
        .iter()
        .filter(|n| !n.is_degenerate())
        .fold(Vec2::ZERO, |m, n| m.max(n.half_extents()))
        + Vec2::splat(padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn grid(n: usize, spacing: f32, size: f32) -> Vec<Node> {
        (0..n)
            .map(|i| {
                let p = Vec2::new((i % 5) as f32 * spacing, (i / 5) as f32 * spacing);
                Node::new(p, Vec2::splat(size))
            })
            .collect()
    }

    #[test]
    fn home_gravity_moves_fraction_of_the_way_home() {
        let mut n = Node::new(Vec2::ZERO, Vec2::ONE).with_home(Vec2::new(5.0, 5.0));
        home_gravity(&mut n, 0.1);
        assert_eq!(n.pos, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn exhaustive_visits_each_unordered_pair_once() {
        let mut nodes = grid(7, 1.0, 1.0);
        let mut seen = Vec::new();
        exhaustive(&mut nodes, 0.0, |_, a, b| seen.push((a, b)));

        assert_eq!(seen.len(), 7 * 6 / 2);
        let unique: BTreeSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len());
        assert!(seen.iter().all(|&(a, b)| a < b));
    }

    #[test]
    fn both_walks_apply_gravity_once_per_node() {
        for traversal in Traversal::ALL {
            let mut nodes: Vec<Node> = grid(6, 50.0, 2.0)
                .into_iter()
                .map(|n| n.with_home(n.pos + Vec2::new(10.0, 0.0)))
                .collect();
            let before: Vec<Vec2> = nodes.iter().map(|n| n.pos).collect();

            walk(traversal, &mut nodes, 0.5, Vec2::ONE, |_, _, _| {});

            for (n, p) in nodes.iter().zip(before) {
                assert_eq!(n.pos, p + Vec2::new(5.0, 0.0), "{traversal}");
            }
        }
    }

    #[test]
    fn quadtree_never_pairs_a_node_with_itself() {
        let mut nodes = grid(12, 3.0, 4.0);
        let r = reach(&nodes, 0.0);
        quadtree(&mut nodes, 0.0, r, |_, a, b| assert_ne!(a, b));
    }

    #[test]
    fn quadtree_finds_every_close_pair() {
        let mut nodes = grid(15, 6.0, 8.0);
        let r = reach(&nodes, 0.0);

        let mut all = BTreeSet::new();
        exhaustive(&mut nodes.clone(), 0.0, |_, a, b| {
            all.insert((a, b));
        });

        let mut found = BTreeSet::new();
        quadtree(&mut nodes, 0.0, r, |ns, a, b| {
            if crate::geometry::rect_overlap(&ns[a], &ns[b], 0.0).is_some() {
                found.insert((a.min(b), a.max(b)));
            }
        });

        let expected: BTreeSet<_> = all
            .into_iter()
            .filter(|&(a, b)| crate::geometry::rect_overlap(&nodes[a], &nodes[b], 0.0).is_some())
            .collect();
        assert!(!expected.is_empty());
        assert_eq!(found, expected);
    }

    #[test]
    fn quadtree_prunes_far_away_nodes() {
        // Two tight clusters far apart.
        let mut nodes: Vec<Node> = (0..10)
            .map(|i| {
                let base = if i < 5 { 0.0 } else { 10_000.0 };
                Node::new(Vec2::new(base + i as f32, base), Vec2::ONE)
            })
            .collect();
        let r = reach(&nodes, 0.0);

        let mut cross = 0;
        let mut total = 0;
        quadtree(&mut nodes, 0.0, r, |_, a, b| {
            total += 1;
            if (a < 5) != (b < 5) {
                cross += 1;
            }
        });
        // 2 * (4 + 3 + 2 + 1) ordered pairs within each cluster at most.
        assert!(total > 0 && total <= 40);
        assert_eq!(cross, 0);
    }

    #[test]
    fn reach_ignores_degenerate_nodes() {
        let nodes = vec![
            Node::new(Vec2::ZERO, Vec2::new(4.0, 2.0)),
            Node::new(Vec2::ZERO, Vec2::new(1000.0, 0.0)),
            Node::new(Vec2::ZERO, Vec2::new(2.0, 6.0)),
        ];
        assert_eq!(reach(&nodes, 1.0), Vec2::new(3.0, 4.0));
    }
}
