//! The simulation that owns the nodes and drives ticks.
//!
//! [`Host`] is all the separation force needs from a layout engine. [`ForceSim`]
//! is a small position-Verlet force layout that implements it, so the force
//! can run without an outside engine.

use glam::Vec2;

use crate::types::Node;

/// Alpha a (re)started simulation begins with.
pub const START_ALPHA: f32 = 0.1;
/// Per-tick alpha multiplier.
pub const ALPHA_DECAY: f32 = 0.99;
/// Below this alpha the simulation stops.
pub const ALPHA_MIN: f32 = 0.005;

/// A simulation that owns a node list and advances it in ticks.
pub trait Host {
    /// Nodes in a stable order for the duration of a tick.
    fn nodes(&self) -> &[Node];

    fn nodes_mut(&mut self) -> &mut [Node];

    /// Advances the simulation by one tick.
    ///
    /// ### Returns
    /// The alpha of the tick, or `None` once the simulation has cooled down
    /// (no tick was run).
    fn step(&mut self) -> Option<f32>;
}

/// Something run at the end of every tick of a [`ForceSim`].
pub trait TickListener {
    fn on_tick(&mut self, nodes: &mut [Node], alpha: f32);
}

impl<F: FnMut(&mut [Node], f32)> TickListener for F {
    fn on_tick(&mut self, nodes: &mut [Node], alpha: f32) {
        self(nodes, alpha)
    }
}

/// Minimal force-directed layout with charge, centre gravity and friction.
///
/// ### Fields
/// - `nodes` - Node list; positions are integrated each tick.
/// - `prev` - Positions at the previous tick; `pos - prev` is the velocity.
/// - `alpha` - Current cooling factor; `0` when stopped.
/// - `charge` - Pairwise charge strength, negative values repel.
/// - `gravity` - Pull toward the centre of `size`.
/// - `friction` - Fraction of velocity kept per tick.
/// - `size` - Layout area; its centre is the gravity target.
/// - `listeners` - Named tick listeners, run in registration order.
pub struct ForceSim {
    nodes: Vec<Node>,
    prev: Vec<Vec2>,
    alpha: f32,
    pub charge: f32,
    pub gravity: f32,
    pub friction: f32,
    pub size: Vec2,
    listeners: Vec<(String, Box<dyn TickListener>)>,
}

impl Default for ForceSim {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            prev: Vec::new(),
            alpha: 0.0,
            charge: -30.0,
            gravity: 0.1,
            friction: 0.9,
            size: Vec2::ONE,
            listeners: Vec::new(),
        }
    }
}

impl std::fmt::Debug for ForceSim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceSim")
            .field("nodes", &self.nodes.len())
            .field("alpha", &self.alpha)
            .field("charge", &self.charge)
            .field("gravity", &self.gravity)
            .field("friction", &self.friction)
            .field("size", &self.size)
            .field(
                "listeners",
                &self.listeners.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ForceSim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine used when the separation force runs standalone: no charge, no
    /// centre gravity and friction 0.85, so only separation and home pull
    /// move the nodes.
    pub fn for_separation() -> Self {
        Self {
            charge: 0.0,
            gravity: 0.0,
            friction: 0.85,
            ..Self::default()
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.set_nodes(nodes);
        self
    }

    /// Replaces the node list; velocities are reset.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.prev = nodes.iter().map(|n| n.pos).collect();
        self.nodes = nodes;
    }

    /// Appends a node at rest.
    pub fn add_node(&mut self, node: Node) {
        self.prev.push(node.pos);
        self.nodes.push(node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.prev.clear();
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Sets alpha directly; negative values stop the simulation.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.max(0.0);
    }

    /// Starts (or reheats) the simulation.
    pub fn start(&mut self) {
        self.alpha = START_ALPHA;
    }

    pub fn stop(&mut self) {
        self.alpha = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.alpha > 0.0
    }

    /// Registers `listener` under `name`, replacing any listener already
    /// registered under that name.
    pub fn on(&mut self, name: impl Into<String>, listener: Box<dyn TickListener>) {
        let name = name.into();
        if let Some(slot) = self.listeners.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = listener;
        } else {
            self.listeners.push((name, listener));
        }
    }

    /// Removes the listener registered under `name`, returning it.
    pub fn off(&mut self, name: &str) -> Option<Box<dyn TickListener>> {
        let i = self.listeners.iter().position(|(n, _)| n == name)?;
        Some(self.listeners.remove(i).1)
    }

    pub fn listener_names(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|(n, _)| n.as_str())
    }

    fn apply_gravity(&mut self) {
        let k = self.alpha * self.gravity;
        if k == 0.0 {
            return;
        }
        let centre = self.size * 0.5;
        for n in &mut self.nodes {
            n.pos += (centre - n.pos) * k;
        }
    }

    fn apply_charge(&mut self) {
        if self.charge == 0.0 {
            return;
        }
        let strength = self.alpha * self.charge;
        for i in 0..self.nodes.len() {
            for j in 0..self.nodes.len() {
                if i == j {
                    continue;
                }
                let d = self.nodes[j].pos - self.nodes[i].pos;
                let d2 = d.length_squared();
                if d2 > 0.0 {
                    self.prev[i] -= d * (strength / d2);
                }
            }
        }
    }

    fn integrate(&mut self) {
        for (n, prev) in self.nodes.iter_mut().zip(&mut self.prev) {
            let old = n.pos;
            n.pos -= (*prev - old) * self.friction;
            *prev = old;
        }
    }
}

impl Host for ForceSim {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    fn step(&mut self) -> Option<f32> {
        if self.alpha <= 0.0 {
            return None;
        }
        self.alpha *= ALPHA_DECAY;
        if self.alpha < ALPHA_MIN {
            self.alpha = 0.0;
            tracing::debug!("force simulation cooled down");
            return None;
        }

        self.apply_gravity();
        self.apply_charge();
        self.integrate();

        let alpha = self.alpha;
        for (_, listener) in &mut self.listeners {
            listener.on_tick(&mut self.nodes, alpha);
        }
        Some(alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn node(x: f32, y: f32) -> Node {
        Node::new(Vec2::new(x, y), Vec2::ONE)
    }

    #[test]
    fn stopped_simulation_does_not_tick() {
        let mut sim = ForceSim::for_separation().with_nodes(vec![node(0.0, 0.0)]);
        assert!(!sim.is_running());
        assert_eq!(sim.step(), None);
    }

    #[test]
    fn alpha_decays_until_cooled() {
        let mut sim = ForceSim::for_separation();
        sim.start();

        let first = sim.step().expect("running");
        assert!((first - START_ALPHA * ALPHA_DECAY).abs() < 1e-7);

        let mut ticks = 1;
        while sim.step().is_some() {
            ticks += 1;
            assert!(ticks < 1000);
        }
        // 0.1 * 0.99^n < 0.005 first holds at n = 299.
        assert_eq!(ticks, 298);
        assert_eq!(sim.alpha(), 0.0);
        assert!(!sim.is_running());
    }

    #[test]
    fn friction_carries_part_of_the_velocity() {
        let mut sim = ForceSim::for_separation().with_nodes(vec![node(0.0, 0.0)]);
        sim.start();
        // Displace the node as a tick listener would.
        sim.nodes_mut()[0].pos.x = 10.0;

        sim.step();
        assert!((sim.nodes()[0].pos.x - 18.5).abs() < 1e-5);

        sim.step();
        // velocity 8.5 * 0.85
        assert!((sim.nodes()[0].pos.x - (18.5 + 8.5 * 0.85)).abs() < 1e-4);
    }

    #[test]
    fn charge_pushes_nodes_apart() {
        let mut sim = ForceSim {
            gravity: 0.0,
            ..ForceSim::default()
        }
        .with_nodes(vec![node(0.0, 0.0), node(1.0, 0.0)]);
        sim.start();
        sim.step();
        sim.step();
        let n = sim.nodes();
        assert!(n[1].pos.x - n[0].pos.x > 1.0);
    }

    #[test]
    fn gravity_pulls_toward_centre() {
        let mut sim = ForceSim {
            charge: 0.0,
            size: Vec2::new(100.0, 100.0),
            ..ForceSim::default()
        }
        .with_nodes(vec![node(0.0, 0.0)]);
        sim.start();
        sim.step();
        let p = sim.nodes()[0].pos;
        assert!(p.x > 0.0 && p.y > 0.0);
    }

    #[test]
    fn listeners_receive_alpha_and_same_name_replaces() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut sim = ForceSim::for_separation().with_nodes(vec![node(0.0, 0.0)]);

        let log = Rc::clone(&seen);
        sim.on(
            "tick.a",
            Box::new(move |_: &mut [Node], alpha: f32| log.borrow_mut().push(("first", alpha))),
        );
        let log = Rc::clone(&seen);
        sim.on(
            "tick.a",
            Box::new(move |_: &mut [Node], alpha: f32| log.borrow_mut().push(("second", alpha))),
        );
        sim.on(
            "tick.b",
            Box::new(|nodes: &mut [Node], _: f32| nodes[0].pos.y += 1.0),
        );
        assert_eq!(sim.listener_names().collect::<Vec<_>>(), vec!["tick.a", "tick.b"]);

        sim.start();
        let alpha = sim.step().expect("running");

        assert_eq!(*seen.borrow(), vec![("second", alpha)]);
        assert_eq!(sim.nodes()[0].pos.y, 1.0);

        assert!(sim.off("tick.b").is_some());
        assert!(sim.off("tick.b").is_none());
    }
}
