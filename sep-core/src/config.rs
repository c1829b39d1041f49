//! Knobs of the separation force.
//!
//! [`Config`] is a plain value: the orchestrator owns one and only changes it
//! through the checked setters below, so an invalid value never reaches a tick.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// Overlap test used for every pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Axis-aligned boxes centred on the node position.
    #[default]
    Rectangle,
    /// Axis-aligned ellipses inscribed in the node box.
    Ellipse,
}

/// Strategy used to enumerate candidate pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Every unordered pair once, O(n²).
    Exhaustive,
    /// Quadtree walk with out-of-reach regions pruned.
    #[default]
    Quadtree,
}

impl Shape {
    pub const ALL: [Shape; 2] = [Shape::Rectangle, Shape::Ellipse];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Rectangle => "rectangle",
            Shape::Ellipse => "ellipse",
        }
    }

    /// Lenient lookup: unknown names fall back to [`Shape::default`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(name, fallback = %Shape::default(), "unknown shape name");
            Shape::default()
        })
    }
}

impl Traversal {
    pub const ALL: [Traversal; 2] = [Traversal::Exhaustive, Traversal::Quadtree];

    pub fn name(self) -> &'static str {
        match self {
            Traversal::Exhaustive => "simple",
            Traversal::Quadtree => "qtree",
        }
    }

    /// Lenient lookup: unknown names fall back to [`Traversal::default`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(name, fallback = %Traversal::default(), "unknown traversal name");
            Traversal::default()
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangle" | "rectangles" | "rect" => Ok(Shape::Rectangle),
            "ellipse" | "ellipses" => Ok(Shape::Ellipse),
            _ => Err(ConfigError::UnknownShape(s.to_owned())),
        }
    }
}

impl FromStr for Traversal {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" | "exhaustive" => Ok(Traversal::Exhaustive),
            "qtree" | "quadtree" => Ok(Traversal::Quadtree),
            _ => Err(ConfigError::UnknownTraversal(s.to_owned())),
        }
    }
}

/// Configuration shared by every node of a tick.
///
/// ### Fields
/// - `padding` - Clearance added to every raw overlap, `>= 0`.
/// - `stickyness` - Fraction of the home pull applied per tick (scaled by alpha).
/// - `conformity` - `1.0` pushes along the home-to-home direction,
///   `0.0` packs boxes side by side along the less overlapped axis.
/// - `shape` - Overlap test variant.
/// - `traversal` - Pair enumeration strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub padding: f32,
    pub stickyness: f32,
    pub conformity: f32,
    pub shape: Shape,
    pub traversal: Traversal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            padding: 10.0,
            stickyness: 0.1,
            conformity: 1.0,
            shape: Shape::Rectangle,
            traversal: Traversal::Quadtree,
        }
    }
}

impl Config {
    /// Checks every numeric knob; used on configs built by hand.
    pub fn validate(&self) -> Result<()> {
        check_padding(self.padding)?;
        check_stickyness(self.stickyness)?;
        check_conformity(self.conformity)?;
        Ok(())
    }

    pub fn set_padding(&mut self, padding: f32) -> Result<()> {
        self.padding = check_padding(padding)?;
        Ok(())
    }

    pub fn set_stickyness(&mut self, stickyness: f32) -> Result<()> {
        self.stickyness = check_stickyness(stickyness)?;
        Ok(())
    }

    pub fn set_conformity(&mut self, conformity: f32) -> Result<()> {
        self.conformity = check_conformity(conformity)?;
        Ok(())
    }
}

fn check_padding(v: f32) -> Result<f32> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(ConfigError::InvalidPadding(v))
    }
}

fn check_stickyness(v: f32) -> Result<f32> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ConfigError::InvalidStickyness(v))
    }
}

fn check_conformity(v: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(ConfigError::InvalidConformity(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.shape, Shape::Rectangle);
        assert_eq!(cfg.traversal, Traversal::Quadtree);
    }

    #[test]
    fn setters_reject_out_of_range_and_keep_previous_value() {
        let mut cfg = Config::default();

        assert_eq!(cfg.set_padding(-1.0), Err(ConfigError::InvalidPadding(-1.0)));
        assert!(cfg.set_padding(f32::INFINITY).is_err());
        assert_eq!(cfg.padding, 10.0);

        assert!(cfg.set_conformity(1.5).is_err());
        assert!(cfg.set_conformity(f32::NAN).is_err());
        assert_eq!(cfg.conformity, 1.0);

        assert!(cfg.set_stickyness(f32::NAN).is_err());
        assert_eq!(cfg.stickyness, 0.1);

        cfg.set_padding(0.0).unwrap();
        cfg.set_conformity(0.0).unwrap();
        cfg.set_stickyness(2.0).unwrap();
        assert_eq!((cfg.padding, cfg.conformity, cfg.stickyness), (0.0, 0.0, 2.0));
    }

    #[test]
    fn validate_catches_hand_built_values() {
        let cfg = Config {
            conformity: -0.1,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidConformity(-0.1)));
    }

    #[test]
    fn names_round_trip_through_display() {
        for shape in Shape::ALL {
            assert_eq!(shape.to_string().parse::<Shape>(), Ok(shape));
        }
        for traversal in Traversal::ALL {
            assert_eq!(traversal.to_string().parse::<Traversal>(), Ok(traversal));
        }
    }

    #[test]
    fn strict_parse_rejects_unknown_names() {
        assert_eq!(
            "hexagon".parse::<Shape>(),
            Err(ConfigError::UnknownShape("hexagon".into()))
        );
        assert!("bvh".parse::<Traversal>().is_err());
    }

    #[test]
    fn lenient_lookup_falls_back_to_default() {
        assert_eq!(Shape::from_name("Ellipse"), Shape::Ellipse);
        assert_eq!(Shape::from_name("hexagon"), Shape::Rectangle);
        assert_eq!(Traversal::from_name("simple"), Traversal::Exhaustive);
        assert_eq!(Traversal::from_name("grid"), Traversal::Quadtree);
    }
}
