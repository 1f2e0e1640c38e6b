// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for structural model exchange
//!
//! Identifiers, plan coordinates, levels and the section/diaphragm references
//! carried by elements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-axis tolerance under which two coordinates are the same point
pub const EXACT_TOLERANCE: f64 = 1e-3;

/// Distance under which a nearest-neighbour match is accepted
pub const FALLBACK_TOLERANCE: f64 = 1e-1;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique element identifier
///
/// Assigned when an element value is created and never reused within the
/// process. Emitted E2K ids (B1, C1, ...) are independent of it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Allocate the next process-unique id
    pub fn next() -> Self {
        ElementId(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side level identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct LevelId(pub u64);

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side property (frame, wall or floor section) identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side diaphragm identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct DiaphragmId(pub u64);

impl fmt::Display for DiaphragmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Textual point identifier as written in `POINT` records
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub String);

impl PointId {
    /// Sentinel text for a point that could not be matched
    pub const UNRESOLVED: &'static str = "0";

    /// The unresolved sentinel id
    pub fn unresolved() -> Self {
        PointId(Self::UNRESOLVED.to_string())
    }

    /// Check whether this is the unresolved sentinel
    pub fn is_unresolved(&self) -> bool {
        self.0 == Self::UNRESOLVED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        PointId(id.to_string())
    }
}

impl From<String> for PointId {
    fn from(id: String) -> Self {
        PointId(id)
    }
}

/// Plan coordinate in the project coordinate space
///
/// Units are whatever the caller uses; the engine never converts them.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Both axis deltas strictly below `tolerance`
    pub fn within(&self, other: &Point2D, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }

    /// Same point under [`EXACT_TOLERANCE`]
    pub fn coincides(&self, other: &Point2D) -> bool {
        self.within(other, EXACT_TOLERANCE)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Point2D::new(x, y)
    }
}

/// Story/level reference: the only level data the engine needs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelRef {
    pub id: LevelId,
    pub name: String,
    pub elevation: f64,
}

impl LevelRef {
    pub fn new(id: LevelId, name: impl Into<String>, elevation: f64) -> Self {
        Self {
            id,
            name: name.into(),
            elevation,
        }
    }
}

/// Cross-section family, classified once from the section name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SectionShape {
    /// W, M, S and HP rolled I-shapes
    WideFlange,
    /// WT, MT and ST cut tees
    Tee,
    /// C and MC channels
    Channel,
    /// Single angles (L)
    Angle,
    /// Double angles (2L)
    DoubleAngle,
    /// Rectangular or square hollow sections (HSS with two dimensions, legacy TS)
    RectangularTube,
    /// Round hollow sections (HSS with diameter and wall) and PIPE
    RoundTube,
    /// Rectangular concrete, written as `12X24` or with a CONC/RC prefix
    ConcreteRectangular,
    /// Circular concrete, written as `24D` or with a CIRC prefix
    ConcreteCircular,
    /// Anything else, including wall and slab property names
    #[default]
    Other,
}

impl SectionShape {
    /// Classify a section by its name
    ///
    /// This is the only place that interprets naming conventions; everything
    /// downstream matches on the returned variant.
    pub fn classify(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let s = upper.as_str();

        if digit_follows(s, "HSS") {
            // HSS8X8X1/2 is rectangular, HSS6.625X.280 is round
            return if s.matches('X').count() >= 2 {
                SectionShape::RectangularTube
            } else {
                SectionShape::RoundTube
            };
        }
        if s.starts_with("PIPE") {
            return SectionShape::RoundTube;
        }
        if digit_follows(s, "TS") {
            return SectionShape::RectangularTube;
        }
        if digit_follows(s, "2L") {
            return SectionShape::DoubleAngle;
        }
        if ["WT", "MT", "ST"].iter().any(|p| digit_follows(s, p)) {
            return SectionShape::Tee;
        }
        if digit_follows(s, "MC") || digit_follows(s, "C") {
            return SectionShape::Channel;
        }
        if ["W", "M", "S", "HP"].iter().any(|p| digit_follows(s, p)) {
            return SectionShape::WideFlange;
        }
        if digit_follows(s, "L") {
            return SectionShape::Angle;
        }
        if s.starts_with("CIRC") || is_round_concrete(s) {
            return SectionShape::ConcreteCircular;
        }
        if s.starts_with("CONC") || s.starts_with("RC") || is_rect_concrete(s) {
            return SectionShape::ConcreteRectangular;
        }
        SectionShape::Other
    }

    /// Steel rolled or built-up shape
    pub fn is_steel(&self) -> bool {
        !matches!(
            self,
            SectionShape::ConcreteRectangular | SectionShape::ConcreteCircular | SectionShape::Other
        )
    }
}

fn digit_follows(s: &str, prefix: &str) -> bool {
    s.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

fn is_dimension(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().any(|c| c.is_ascii_digit())
}

/// `12X24`, `16.5X30`
fn is_rect_concrete(s: &str) -> bool {
    match s.split_once('X') {
        Some((w, d)) => is_dimension(w) && is_dimension(d),
        None => false,
    }
}

/// `24D`, `30.5D`
fn is_round_concrete(s: &str) -> bool {
    s.strip_suffix('D').is_some_and(is_dimension)
}

/// Section (property) reference carried by elements
///
/// Import fills `name` from the text and `property` from the host's table
/// when the name is known there. Export prefers `property` and falls back to
/// `name`.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionRef {
    pub property: Option<PropertyId>,
    pub name: String,
    pub shape: SectionShape,
}

impl SectionRef {
    /// Reference by section name only
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let shape = SectionShape::classify(&name);
        Self {
            property: None,
            name,
            shape,
        }
    }

    /// Reference by host property id
    pub fn property(id: PropertyId) -> Self {
        Self {
            property: Some(id),
            name: String::new(),
            shape: SectionShape::Other,
        }
    }

    /// Attach a host property id
    pub fn with_property(mut self, id: Option<PropertyId>) -> Self {
        self.property = id;
        self
    }
}

/// Diaphragm reference carried by floors
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DiaphragmRef {
    pub id: Option<DiaphragmId>,
    pub name: String,
}

impl DiaphragmRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn id(id: DiaphragmId) -> Self {
        Self {
            id: Some(id),
            name: String::new(),
        }
    }
}
