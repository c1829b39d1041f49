use glam::Vec2;
use rand::Rng;

/// Identifier for a node in the host's node list.
///
/// This is an index into the slice handed to a tick, and is only meaningful
/// while that slice keeps its order (the host guarantees this within a tick).
pub type NodeId = usize;

/// A positioned, sized shape taking part in the layout.
///
/// `size` is the full extent along each axis: box width/height for
/// rectangles, axis lengths (diameters) for ellipses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub pos: Vec2,
    pub home: Vec2,
    pub size: Vec2,
}

impl Node {
    /// Creates a node sitting at its own home position.
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            home: pos,
            size,
        }
    }

    /// Node with a random home in `[-half_range, half_range]²` and a random
    /// size between `min_size` and `max_size`, sitting at its home.
    pub fn random_in_square(
        half_range: f32,
        min_size: Vec2,
        max_size: Vec2,
        rng: &mut impl Rng,
    ) -> Self {
        let pos = Vec2::new(
            rng.random_range(-half_range..=half_range),
            rng.random_range(-half_range..=half_range),
        );
        let size = Vec2::new(
            rng.random_range(min_size.x..=max_size.x),
            rng.random_range(min_size.y..=max_size.y),
        );
        Self::new(pos, size)
    }

    pub fn with_home(mut self, home: Vec2) -> Self {
        self.home = home;
        self
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    /// Returns `true` if the node cannot take part in overlap resolution
    /// (zero, negative or non-finite extent on either axis).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0 && self.size.is_finite())
    }
}

/// Returns mutable references to two distinct nodes of a slice.
///
/// ### Panics
/// Panics if `i == j` or either index is out of bounds.
pub fn pair_mut(nodes: &mut [Node], i: NodeId, j: NodeId) -> (&mut Node, &mut Node) {
    assert_ne!(i, j, "a node cannot be paired with itself");
    if i < j {
        let (lo, hi) = nodes.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = nodes.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}
