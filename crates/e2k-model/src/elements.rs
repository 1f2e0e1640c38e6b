// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural element values and the flat container that aggregates them
//!
//! Elements are plain values: created once (by import, or by a host for
//! export) and never mutated through shared references afterwards.

use crate::{DiaphragmRef, ElementId, LevelId, Point2D, SectionRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of structural element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementKind {
    Beam,
    Column,
    Brace,
    Wall,
    Floor,
    Opening,
    Grid,
}

impl ElementKind {
    /// All kinds, in export order
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Grid,
        ElementKind::Column,
        ElementKind::Wall,
        ElementKind::Floor,
        ElementKind::Opening,
        ElementKind::Beam,
        ElementKind::Brace,
    ];

    /// Prefix of the positional ids written to E2K (B1, C1, ...)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ElementKind::Beam => "B",
            ElementKind::Column => "C",
            ElementKind::Brace => "D",
            ElementKind::Wall => "W",
            ElementKind::Floor => "F",
            ElementKind::Opening => "O",
            ElementKind::Grid => "G",
        }
    }

    /// Kind whose positional ids start like `id` (`"C12"` → column)
    pub fn from_id_prefix(id: &str) -> Option<Self> {
        let first = id.trim().chars().next()?.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.id_prefix().starts_with(first))
    }

    /// Line elements carry two end points
    pub fn is_line(&self) -> bool {
        matches!(
            self,
            ElementKind::Beam | ElementKind::Column | ElementKind::Brace
        )
    }

    /// Area elements carry a polygon
    pub fn is_area(&self) -> bool {
        matches!(
            self,
            ElementKind::Wall | ElementKind::Floor | ElementKind::Opening
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::Beam => "beam",
            ElementKind::Column => "column",
            ElementKind::Brace => "brace",
            ElementKind::Wall => "wall",
            ElementKind::Floor => "floor",
            ElementKind::Opening => "opening",
            ElementKind::Grid => "grid",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Horizontal framing member on one level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub id: ElementId,
    pub start: Point2D,
    pub end: Point2D,
    pub level: LevelId,
    pub section: SectionRef,
    /// End release code written verbatim (e.g. `PINNED`)
    pub release: Option<String>,
}

impl Beam {
    pub fn new(start: Point2D, end: Point2D, level: LevelId, section: SectionRef) -> Self {
        Self {
            id: ElementId::next(),
            start,
            end,
            level,
            section,
            release: None,
        }
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }
}

/// Vertical member between a base and a top level
///
/// `start` is the plan location at the base, `end` at the top; they differ
/// only for sloped columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ElementId,
    pub start: Point2D,
    pub end: Point2D,
    pub base_level: LevelId,
    pub top_level: LevelId,
    pub section: SectionRef,
}

impl Column {
    pub fn new(
        start: Point2D,
        end: Point2D,
        base_level: LevelId,
        top_level: LevelId,
        section: SectionRef,
    ) -> Self {
        Self {
            id: ElementId::next(),
            start,
            end,
            base_level,
            top_level,
            section,
        }
    }

    /// Plumb column at one plan location
    pub fn vertical(at: Point2D, base_level: LevelId, top_level: LevelId, section: SectionRef) -> Self {
        Self::new(at, at, base_level, top_level, section)
    }
}

/// Diagonal member; may stay within one level or span down to the one below
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brace {
    pub id: ElementId,
    pub start: Point2D,
    pub end: Point2D,
    pub base_level: LevelId,
    pub top_level: LevelId,
    pub section: SectionRef,
}

impl Brace {
    pub fn new(
        start: Point2D,
        end: Point2D,
        base_level: LevelId,
        top_level: LevelId,
        section: SectionRef,
    ) -> Self {
        Self {
            id: ElementId::next(),
            start,
            end,
            base_level,
            top_level,
            section,
        }
    }
}

/// Wall panel; `points` is its plan trace (two points tolerated)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: ElementId,
    pub points: Vec<Point2D>,
    pub base_level: LevelId,
    pub top_level: LevelId,
    pub section: SectionRef,
}

impl Wall {
    pub fn new(
        points: Vec<Point2D>,
        base_level: LevelId,
        top_level: LevelId,
        section: SectionRef,
    ) -> Self {
        Self {
            id: ElementId::next(),
            points,
            base_level,
            top_level,
            section,
        }
    }
}

/// Floor slab polygon on one level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: ElementId,
    pub points: Vec<Point2D>,
    pub level: LevelId,
    pub section: SectionRef,
    pub diaphragm: Option<DiaphragmRef>,
}

impl Floor {
    pub fn new(points: Vec<Point2D>, level: LevelId, section: SectionRef) -> Self {
        Self {
            id: ElementId::next(),
            points,
            level,
            section,
            diaphragm: None,
        }
    }

    pub fn with_diaphragm(mut self, diaphragm: DiaphragmRef) -> Self {
        self.diaphragm = Some(diaphragm);
        self
    }
}

/// Floor opening polygon on one level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub id: ElementId,
    pub points: Vec<Point2D>,
    pub level: LevelId,
}

impl Opening {
    pub fn new(points: Vec<Point2D>, level: LevelId) -> Self {
        Self {
            id: ElementId::next(),
            points,
            level,
        }
    }
}

/// Grid axis direction for cartesian grid lines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridAxis {
    X,
    Y,
}

impl GridAxis {
    pub fn keyword(&self) -> &'static str {
        match self {
            GridAxis::X => "X",
            GridAxis::Y => "Y",
        }
    }
}

/// Placement of a grid line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GridGeometry {
    /// Infinite line at `coordinate` along the other axis
    Axis { axis: GridAxis, coordinate: f64 },
    /// Bounded line between two plan points
    Segment { start: Point2D, end: Point2D },
}

/// Labelled grid line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub id: ElementId,
    pub system: String,
    pub label: String,
    pub geometry: GridGeometry,
}

impl Grid {
    pub fn new(system: impl Into<String>, label: impl Into<String>, geometry: GridGeometry) -> Self {
        Self {
            id: ElementId::next(),
            system: system.into(),
            label: label.into(),
            geometry,
        }
    }

    /// Bounded grid between two points
    pub fn segment(label: impl Into<String>, start: Point2D, end: Point2D) -> Self {
        Self::new("G1", label, GridGeometry::Segment { start, end })
    }
}

/// Flat set of element lists, one per kind
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementContainer {
    pub beams: Vec<Beam>,
    pub columns: Vec<Column>,
    pub braces: Vec<Brace>,
    pub walls: Vec<Wall>,
    pub floors: Vec<Floor>,
    pub openings: Vec<Opening>,
    pub grids: Vec<Grid>,
}

impl ElementContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements of one kind
    pub fn count(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Beam => self.beams.len(),
            ElementKind::Column => self.columns.len(),
            ElementKind::Brace => self.braces.len(),
            ElementKind::Wall => self.walls.len(),
            ElementKind::Floor => self.floors.len(),
            ElementKind::Opening => self.openings.len(),
            ElementKind::Grid => self.grids.len(),
        }
    }

    /// Total element count
    pub fn len(&self) -> usize {
        ElementKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
