//! Point quadtree over node centres, used to prune pair tests.

use glam::Vec2;

use crate::types::NodeId;

/// Points closer than this (L1 distance) are stacked instead of split.
const COINCIDENT: f32 = 0.01;

/// Axis-aligned bounds of a quadtree cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub min: Vec2,
    pub max: Vec2,
}

impl Region {
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Sub-region for quadrant `i` (`bit 0` = right half, `bit 1` = lower half).
    fn quadrant(&self, i: usize) -> Region {
        let c = self.center();
        let (x0, x1) = if i & 1 == 0 {
            (self.min.x, c.x)
        } else {
            (c.x, self.max.x)
        };
        let (y0, y1) = if i & 2 == 0 {
            (self.min.y, c.y)
        } else {
            (c.y, self.max.y)
        };
        Region {
            min: Vec2::new(x0, y0),
            max: Vec2::new(x1, y1),
        }
    }

    fn quadrant_of(&self, p: Vec2) -> usize {
        let c = self.center();
        (((p.y >= c.y) as usize) << 1) | ((p.x >= c.x) as usize)
    }
}

#[derive(Debug)]
pub struct QuadNode {
    pub point: Option<(NodeId, Vec2)>,
    pub children: [Option<usize>; 4],
}

impl QuadNode {
    fn empty() -> Self {
        Self {
            point: None,
            children: [None; 4],
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Arena-backed quadtree; node `0` is the root.
#[derive(Debug)]
pub struct Quadtree {
    pub nodes: Vec<QuadNode>,
    pub bounds: Region,
}

impl Quadtree {
    /// Builds a tree over `points`, identifying each by its position in the
    /// iterator. Non-finite points are left out.
    ///
    /// The root covers the bounding box of the points, grown to a square.
    pub fn from_points(points: &[Vec2]) -> Self {
        let finite = || points.iter().copied().filter(|p| p.is_finite());

        let (mut min, mut max) = finite().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(p), hi.max(p)),
        );
        if !min.is_finite() {
            min = Vec2::ZERO;
            max = Vec2::ZERO;
        }
        let d = max - min;
        if d.x > d.y {
            max.y = min.y + d.x;
        } else {
            max.x = min.x + d.y;
        }

        let mut tree = Self {
            nodes: Vec::with_capacity(points.len() * 2 + 1),
            bounds: Region { min, max },
        };
        tree.nodes.push(QuadNode::empty());

        for (id, &p) in points.iter().enumerate() {
            if p.is_finite() {
                tree.insert(id, p);
            }
        }
        tree
    }

    fn insert(&mut self, id: NodeId, p: Vec2) {
        let mut n = 0;
        let mut region = self.bounds;
        loop {
            if self.nodes[n].is_leaf() {
                match self.nodes[n].point {
                    None => {
                        self.nodes[n].point = Some((id, p));
                        return;
                    }
                    Some((other, q)) => {
                        // Stack instead of splitting when the points are too
                        // close to tell apart, or when float precision leaves
                        // no room to split the cell any further.
                        let stacked = (q - p).abs().element_sum() < COINCIDENT
                            || !region.center().is_finite()
                            || region.quadrant(region.quadrant_of(p)) == region;
                        if !stacked {
                            self.nodes[n].point = None;
                            let (c, _) = self.child(n, region, q);
                            self.nodes[c].point = Some((other, q));
                        }
                    }
                }
            }
            (n, region) = self.child(n, region, p);
        }
    }

    /// Child of `n` whose quadrant holds `p`, created if missing.
    fn child(&mut self, n: usize, region: Region, p: Vec2) -> (usize, Region) {
        let i = region.quadrant_of(p);
        let c = match self.nodes[n].children[i] {
            Some(c) => c,
            None => {
                let c = self.nodes.len();
                self.nodes.push(QuadNode::empty());
                self.nodes[n].children[i] = Some(c);
                c
            }
        };
        (c, region.quadrant(i))
    }

    /// Walks the tree in pre-order.
    ///
    /// `f` receives each cell's bounds and the point stored there, if any.
    /// Returning `true` skips the cell's children.
    pub fn visit(&self, mut f: impl FnMut(Region, Option<NodeId>) -> bool) {
        let mut stack = vec![(0usize, self.bounds)];
        while let Some((n, region)) = stack.pop() {
            let node = &self.nodes[n];
            if f(region, node.point.map(|(id, _)| id)) {
                continue;
            }
            // Reverse push keeps quadrants in 0..4 order.
            for i in (0..4).rev() {
                if let Some(c) = node.children[i] {
                    stack.push((c, region.quadrant(i)));
                }
            }
        }
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.point.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].point.is_none() && self.nodes[0].is_leaf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_points(tree: &Quadtree) -> Vec<NodeId> {
        let mut ids = Vec::new();
        tree.visit(|_, p| {
            ids.extend(p);
            false
        });
        ids.sort_unstable();
        ids
    }

    #[test]
    fn empty_tree_has_single_empty_root() {
        let tree = Quadtree::from_points(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        let mut visited = 0;
        tree.visit(|_, p| {
            assert!(p.is_none());
            visited += 1;
            false
        });
        assert_eq!(visited, 1);
    }

    #[test]
    fn root_bounds_are_square() {
        let tree = Quadtree::from_points(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 4.0)]);
        assert_eq!(tree.bounds.min, Vec2::new(0.0, 0.0));
        assert_eq!(tree.bounds.max, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn every_point_is_visited_once() {
        let pts: Vec<Vec2> = (0..37)
            .map(|i| Vec2::new((i * 7 % 13) as f32, (i * 5 % 11) as f32 * 1.5))
            .collect();
        let tree = Quadtree::from_points(&pts);
        assert_eq!(tree.len(), pts.len());
        assert_eq!(collect_points(&tree), (0..pts.len()).collect::<Vec<_>>());
    }

    #[test]
    fn coincident_points_are_all_kept() {
        let p = Vec2::new(3.0, 3.0);
        let pts = [p, p, p + Vec2::splat(0.001), Vec2::new(9.0, 1.0)];
        let tree = Quadtree::from_points(&pts);
        assert_eq!(collect_points(&tree), vec![0, 1, 2, 3]);
    }

    #[test]
    fn points_one_ulp_apart_are_stacked() {
        let x = 131_072.0f32;
        let next = f32::from_bits(x.to_bits() + 1);
        assert!(next - x > COINCIDENT);

        let pts = [Vec2::new(x, 0.0), Vec2::new(next, 0.0)];
        let tree = Quadtree::from_points(&pts);
        assert_eq!(collect_points(&tree), vec![0, 1]);

        let pts = [
            Vec2::new(x, x),
            Vec2::new(next, x),
            Vec2::new(x, next),
            Vec2::new(next, next),
        ];
        let tree = Quadtree::from_points(&pts);
        assert_eq!(collect_points(&tree), vec![0, 1, 2, 3]);
    }

    #[test]
    fn many_identical_points_do_not_exhaust_the_stack() {
        let pts = vec![Vec2::new(7.0, -2.0); 5_000];
        let tree = Quadtree::from_points(&pts);
        assert_eq!(tree.len(), pts.len());
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(f32::NAN, 1.0), Vec2::new(4.0, 4.0)];
        let tree = Quadtree::from_points(&pts);
        assert_eq!(collect_points(&tree), vec![0, 2]);
    }

    #[test]
    fn visited_regions_contain_their_points() {
        let pts: Vec<Vec2> = (0..20)
            .map(|i| Vec2::new(i as f32 * 3.1, (i * i % 17) as f32))
            .collect();
        let tree = Quadtree::from_points(&pts);
        tree.visit(|r, p| {
            if let Some(id) = p {
                let q = pts[id];
                assert!(q.cmpge(r.min).all() && q.cmple(r.max).all(), "{q:?} in {r:?}");
            }
            false
        });
    }

    #[test]
    fn pruning_skips_subtrees() {
        let pts: Vec<Vec2> = (0..16)
            .map(|i| Vec2::new((i % 4) as f32 * 10.0, (i / 4) as f32 * 10.0))
            .collect();
        let tree = Quadtree::from_points(&pts);

        let mut seen = Vec::new();
        tree.visit(|r, p| {
            seen.extend(p);
            // Only descend into cells touching the top-left corner.
            r.min.x > 0.0 || r.min.y > 0.0
        });
        assert!(seen.contains(&0));
        assert!(seen.len() < pts.len());
    }
}
