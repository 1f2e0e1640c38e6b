// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Format-near E2K records and the keyed tables that hold them
//!
//! A connectivity record binds an element id to geometry (point ids); an
//! assignment record binds an element id to one story's worth of attributes.
//! Both sides are keyed by the same textual element id.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Records stored in a [`RecordTable`] expose their textual key
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Value of an assignment field the codec does not interpret
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// `"quoted"`
    Text(String),
    /// bare number
    Number(f64),
    /// bare keyword
    Word(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "\"{}\"", s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Word(w) => f.write_str(w),
        }
    }
}

/// `POINT "id" x y`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Keyed for PointRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Category tag of a `LINE` record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    Beam,
    Column,
    Brace,
}

impl LineKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            LineKind::Beam => "BEAM",
            LineKind::Column => "COLUMN",
            LineKind::Brace => "BRACE",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BEAM" => Some(LineKind::Beam),
            "COLUMN" => Some(LineKind::Column),
            "BRACE" => Some(LineKind::Brace),
            _ => None,
        }
    }
}

/// `LINE "id" BEAM|COLUMN|BRACE "p1" "p2" storyOffset`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineConnectivity {
    pub id: String,
    pub kind: LineKind,
    pub start: String,
    pub end: String,
    /// 1 when the start point sits one story below the assigned story
    pub story_offset: i32,
}

impl LineConnectivity {
    /// Columns are vertical by category
    pub fn is_vertical(&self) -> bool {
        self.kind == LineKind::Column
    }

    pub fn spans_story_below(&self) -> bool {
        self.story_offset > 0
    }
}

impl Keyed for LineConnectivity {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Frame meshing: station spacing or a minimum station count
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MeshSpec {
    /// `MAXSTASPC s`
    MaxStationSpacing(f64),
    /// `MINNUMSTA n`
    MinStations(u32),
}

/// `LINEASSIGN "id" "story" SECTION "name" ...`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineAssignment {
    pub id: String,
    pub story: String,
    pub section: String,
    pub release: Option<String>,
    pub mesh: Option<MeshSpec>,
    pub auto_mesh: Option<bool>,
    pub mesh_at_intersections: Option<bool>,
    pub extra: Vec<(String, FieldValue)>,
}

impl LineAssignment {
    pub fn new(id: impl Into<String>, story: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            story: story.into(),
            section: section.into(),
            release: None,
            mesh: None,
            auto_mesh: None,
            mesh_at_intersections: None,
            extra: Vec::new(),
        }
    }
}

impl Keyed for LineAssignment {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Category tag of an `AREA` record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaKind {
    Panel,
    Floor,
}

impl AreaKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            AreaKind::Panel => "PANEL",
            AreaKind::Floor => "FLOOR",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PANEL" => Some(AreaKind::Panel),
            "FLOOR" => Some(AreaKind::Floor),
            _ => None,
        }
    }
}

/// `AREA "id" PANEL|FLOOR n "p1" ... "pn" o1 ... on`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaConnectivity {
    pub id: String,
    pub kind: AreaKind,
    pub points: Vec<String>,
    pub story_offsets: Vec<i32>,
}

impl AreaConnectivity {
    pub fn spans_story_below(&self) -> bool {
        self.story_offsets.iter().any(|o| *o > 0)
    }
}

impl Keyed for AreaConnectivity {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Section attributes of an `AREAASSIGN` row
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaSectionAssignment {
    pub section: String,
    pub mesh_type: Option<String>,
    pub add_restraint: Option<bool>,
    pub cardinal_point: Option<String>,
    pub transform_stiffness: Option<bool>,
    pub extra: Vec<(String, FieldValue)>,
}

/// What an `AREAASSIGN` row assigns
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AreaAssignmentBody {
    /// `SECTION "name" OBJMESHTYPE ...`
    Section(AreaSectionAssignment),
    /// `DIAPH "name"`
    Diaphragm(String),
    /// `OPENING "Yes"`
    Opening,
}

/// `AREAASSIGN "id" "story" ...`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaAssignment {
    pub id: String,
    pub story: String,
    pub body: AreaAssignmentBody,
}

impl AreaAssignment {
    pub fn is_opening(&self) -> bool {
        matches!(self.body, AreaAssignmentBody::Opening)
    }
}

impl Keyed for AreaAssignment {
    fn key(&self) -> &str {
        &self.id
    }
}

/// `STORY "name" HEIGHT h [ELEV e] [MASTERSTORY "Yes"]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub name: String,
    pub height: Option<f64>,
    pub elevation: Option<f64>,
    pub master: Option<bool>,
}

impl Keyed for StoryRecord {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Placement fields of a `GRID` record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GridPlacement {
    /// `DIR "X"|"Y" COORD c`
    Axis { direction: String, coordinate: f64 },
    /// `DIR "GENERAL" X1 a Y1 b X2 c Y2 d`
    General { x1: f64, y1: f64, x2: f64, y2: f64 },
}

/// `GRID "system" LABEL "l" ...`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridRecord {
    pub system: String,
    pub label: String,
    pub placement: GridPlacement,
}

/// `DIAPHRAGM "name" TYPE RIGID|SEMIRIGID`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiaphragmRecord {
    pub name: String,
    pub rigidity: String,
}

impl Keyed for DiaphragmRecord {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Insertion-ordered table of records keyed by textual id
///
/// A later record with an existing key replaces the earlier one in place.
#[derive(Clone, Debug)]
pub struct RecordTable<R> {
    records: Vec<R>,
    index: FxHashMap<String, usize>,
}

impl<R> Default for RecordTable<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<R: Keyed> RecordTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; returns `true` when it replaced an existing key
    pub fn insert(&mut self, record: R) -> bool {
        match self.index.get(record.key()) {
            Some(&pos) => {
                self.records[pos] = record;
                true
            }
            None => {
                self.index.insert(record.key().to_string(), self.records.len());
                self.records.push(record);
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&R> {
        self.index.get(key).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Keyed> FromIterator<R> for RecordTable<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

/// Per-element ordered lists of assignment rows
///
/// Element ids keep the order in which they were first seen; rows keep
/// their text order.
#[derive(Clone, Debug)]
pub struct AssignmentTable<R> {
    order: Vec<String>,
    rows: FxHashMap<String, Vec<R>>,
}

impl<R> Default for AssignmentTable<R> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            rows: FxHashMap::default(),
        }
    }
}

impl<R: Keyed> AssignmentTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: R) {
        match self.rows.get_mut(row.key()) {
            Some(list) => list.push(row),
            None => {
                self.order.push(row.key().to_string());
                self.rows.insert(row.key().to_string(), vec![row]);
            }
        }
    }

    /// Rows for one element, in text order
    pub fn rows(&self, key: &str) -> &[R] {
        self.rows.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Element ids in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(element id, rows)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[R])> {
        self.order
            .iter()
            .map(move |key| (key.as_str(), self.rows(key)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    /// Number of element ids
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Total number of rows
    pub fn row_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<R: Keyed> FromIterator<R> for AssignmentTable<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut table = Self::new();
        for row in iter {
            table.push(row);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, x: f64) -> PointRecord {
        PointRecord {
            id: id.to_string(),
            x,
            y: 0.0,
        }
    }

    #[test]
    fn test_record_table_replaces_in_place() {
        let mut table = RecordTable::new();
        assert!(!table.insert(point("1", 0.0)));
        assert!(!table.insert(point("2", 5.0)));
        assert!(table.insert(point("1", 9.0)));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("1").map(|p| p.x), Some(9.0));
        let order: Vec<_> = table.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["1", "2"]);
    }

    #[test]
    fn test_assignment_table_keeps_order() {
        let table: AssignmentTable<LineAssignment> = vec![
            LineAssignment::new("C2", "Story1", "W14X90"),
            LineAssignment::new("C1", "Story1", "W14X90"),
            LineAssignment::new("C2", "Story2", "W14X90"),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["C2", "C1"]);
        assert_eq!(table.rows("C2").len(), 2);
        assert_eq!(table.rows("C2")[1].story, "Story2");
        assert_eq!(table.row_count(), 3);
        assert!(table.rows("C9").is_empty());
    }

    #[test]
    fn test_line_kind_keywords() {
        assert_eq!(LineKind::from_keyword("column"), Some(LineKind::Column));
        assert_eq!(LineKind::from_keyword("NULL"), None);
        assert_eq!(AreaKind::from_keyword("PANEL"), Some(AreaKind::Panel));
    }

    #[test]
    fn test_connectivity_flags() {
        let column = LineConnectivity {
            id: "C1".to_string(),
            kind: LineKind::Column,
            start: "1".to_string(),
            end: "1".to_string(),
            story_offset: 1,
        };
        assert!(column.is_vertical());
        assert!(column.spans_story_below());

        let wall = AreaConnectivity {
            id: "W1".to_string(),
            kind: AreaKind::Panel,
            points: vec!["1".to_string(), "2".to_string()],
            story_offsets: vec![0, 0],
        };
        assert!(!wall.spans_story_below());
    }
}
