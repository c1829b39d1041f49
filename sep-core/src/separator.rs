//! The separation force: per-tick orchestration and its configuration surface.
//!
//! A tick of the force runs, in order:
//! 1. Home gravity on each node (`alpha * stickyness`).
//! 2. The configured [`Traversal`] enumerating candidate pairs.
//! 3. The configured [`Shape`] overlap test on each pair, and the resolver
//!    pushing overlapping pairs apart.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    config::{Config, Shape, Traversal},
    error::Result,
    geometry,
    host::{ForceSim, Host, TickListener},
    resolve, traversal,
    types::{Node, NodeId, pair_mut},
};

/// Name the force registers under when attached to a [`ForceSim`].
pub const TICK_EVENT: &str = "tick.separate";

/// Outcome of one separation tick.
///
/// ### Fields
/// - `alpha` - Alpha the tick ran with.
/// - `tested` - Pair tests performed (redundant quadtree visits included).
/// - `skipped` - Pairs left alone because a node has a degenerate size.
/// - `corrected` - Pairs that were pushed apart, as `(min, max)` indices,
///   in the order they were corrected. May repeat a pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub alpha: f32,
    pub tested: usize,
    pub skipped: usize,
    pub corrected: Vec<(NodeId, NodeId)>,
}

impl TickReport {
    /// Distinct pairs corrected during the tick.
    pub fn corrected_pairs(&self) -> BTreeSet<(NodeId, NodeId)> {
        self.corrected.iter().copied().collect()
    }
}

/// The per-tick separation step, independent of any host.
///
/// Owns the configuration and the random source used for pairs whose home
/// positions coincide.
#[derive(Debug)]
pub struct SeparationPass<R = StdRng> {
    config: Config,
    rng: R,
}

impl SeparationPass<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Pass with a reproducible random source.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SeparationPass<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SeparationPass<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            config: Config::default(),
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the whole configuration after validating it.
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Runs one tick of the force over `nodes`.
    pub fn run(&mut self, nodes: &mut [Node], alpha: f32) -> TickReport {
        let cfg = self.config;
        let rng = &mut self.rng;
        let mut report = TickReport {
            alpha,
            ..TickReport::default()
        };

        let k = alpha * cfg.stickyness;
        let reach = traversal::reach(nodes, cfg.padding);

        traversal::walk(cfg.traversal, nodes, k, reach, |nodes, i, j| {
            if nodes[i].is_degenerate() || nodes[j].is_degenerate() {
                tracing::trace!(i, j, "skipping pair with degenerate node");
                report.skipped += 1;
                return;
            }
            report.tested += 1;

            let Some(contact) = geometry::overlap(cfg.shape, &nodes[i], &nodes[j], cfg.padding)
            else {
                return;
            };
            let (first, second) = if contact.swapped { (j, i) } else { (i, j) };
            let (a, b) = pair_mut(nodes, first, second);
            resolve::separate(a, b, contact.overlap, alpha, cfg.conformity, &mut *rng);
            report.corrected.push((i.min(j), i.max(j)));
        });

        report
    }
}

impl<R: Rng> TickListener for SeparationPass<R> {
    fn on_tick(&mut self, nodes: &mut [Node], alpha: f32) {
        let report = self.run(nodes, alpha);
        tracing::debug!(
            event = TICK_EVENT,
            alpha,
            tested = report.tested,
            corrected = report.corrected.len(),
            skipped = report.skipped,
            "separation tick"
        );
    }
}

/// A host simulation with the separation force attached.
///
/// Each [`Separator::tick`] advances the host by one tick and then runs the
/// separation pass with that tick's alpha, so every other effect of the host
/// is already integrated when overlaps are resolved.
///
/// Getters and setters mirror the knobs of [`Config`]; setters return
/// `&mut Self` (wrapped in a `Result` when the value is checked) so they can
/// be chained.
#[derive(Debug)]
pub struct Separator<H: Host = ForceSim, R: Rng = StdRng> {
    host: H,
    pass: SeparationPass<R>,
}

impl Separator<ForceSim, StdRng> {
    /// Separator over [`ForceSim::for_separation`] with no nodes yet.
    pub fn standalone() -> Self {
        Self::new(ForceSim::for_separation())
    }
}

impl<H: Host> Separator<H, StdRng> {
    pub fn new(host: H) -> Self {
        Self::with_pass(host, SeparationPass::new())
    }

    pub fn with_seed(host: H, seed: u64) -> Self {
        Self::with_pass(host, SeparationPass::with_seed(seed))
    }
}

impl<H: Host, R: Rng> Separator<H, R> {
    pub fn with_pass(host: H, pass: SeparationPass<R>) -> Self {
        Self { host, pass }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn nodes(&self) -> &[Node] {
        self.host.nodes()
    }

    pub fn config(&self) -> &Config {
        self.pass.config()
    }

    pub fn set_config(&mut self, config: Config) -> Result<&mut Self> {
        self.pass.set_config(config)?;
        Ok(self)
    }

    pub fn padding(&self) -> f32 {
        self.config().padding
    }

    pub fn set_padding(&mut self, padding: f32) -> Result<&mut Self> {
        self.pass.config.set_padding(padding)?;
        Ok(self)
    }

    pub fn stickyness(&self) -> f32 {
        self.config().stickyness
    }

    pub fn set_stickyness(&mut self, stickyness: f32) -> Result<&mut Self> {
        self.pass.config.set_stickyness(stickyness)?;
        Ok(self)
    }

    pub fn conformity(&self) -> f32 {
        self.config().conformity
    }

    pub fn set_conformity(&mut self, conformity: f32) -> Result<&mut Self> {
        self.pass.config.set_conformity(conformity)?;
        Ok(self)
    }

    pub fn shape(&self) -> Shape {
        self.config().shape
    }

    pub fn set_shape(&mut self, shape: Shape) -> &mut Self {
        self.pass.config.shape = shape;
        self
    }

    pub fn traversal(&self) -> Traversal {
        self.config().traversal
    }

    pub fn set_traversal(&mut self, traversal: Traversal) -> &mut Self {
        self.pass.config.traversal = traversal;
        self
    }

    /// Advances the host one tick and separates the nodes.
    ///
    /// ### Returns
    /// The report of the separation pass, or `None` if the host has cooled
    /// down and ran no tick.
    pub fn tick(&mut self) -> Option<TickReport> {
        let alpha = self.host.step()?;
        let _span = tracing::debug_span!("tick", event = TICK_EVENT, alpha).entered();

        let report = self.pass.run(self.host.nodes_mut(), alpha);
        tracing::debug!(
            tested = report.tested,
            corrected = report.corrected.len(),
            skipped = report.skipped,
            "separation tick"
        );
        Some(report)
    }

    /// Ticks until the host cools down or `max_ticks` is reached.
    ///
    /// ### Returns
    /// The number of ticks run.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick().is_some() {
            ticks += 1;
        }
        tracing::info!(ticks, "separation run finished");
        ticks
    }
}
