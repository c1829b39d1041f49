//! Overlap separation force for iterative 2-D layouts.
//!
//! Nodes drift toward home positions under a host simulation; each tick this
//! force pulls them home a little and pushes overlapping rectangles or
//! ellipses apart.
//!
//! Main components:
//! - [`types`] - nodes and node ids.
//! - [`config`] - knobs of the force and their validation.
//! - [`geometry`] - rectangle and ellipse overlap tests.
//! - [`resolve`] - splitting an overlap into equal and opposite nudges.
//! - [`quadtree`] - point quadtree used to prune pair tests.
//! - [`traversal`] - home gravity and the per-tick pair walks.
//! - [`host`] - host simulation seam and a standalone force layout.
//! - [`separator`] - the per-tick orchestration and configuration surface.
//! - [`error`] - configuration errors.

pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod quadtree;
pub mod resolve;
pub mod separator;
pub mod traversal;
pub mod types;

pub use config::{Config, Shape, Traversal};
pub use error::{ConfigError, Result};
pub use host::{ForceSim, Host, TickListener};
pub use separator::{SeparationPass, Separator, TICK_EVENT, TickReport};
pub use types::{Node, NodeId};
