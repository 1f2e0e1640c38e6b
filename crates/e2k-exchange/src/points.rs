// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point registry
//!
//! Deduplicates plan coordinates into textual point ids for one exchange
//! pass. Export interns coordinates and receives sequential ids `"1"`,
//! `"2"`, ...; import registers the ids read from `POINT` records.
//!
//! Exact matching uses a uniform grid with the exact tolerance as cell size,
//! so a lookup only inspects the 3×3 cells around the query. The fallback
//! nearest-point search is a full scan.

use e2k_model::{Point2D, PointId, PointRecord, EXACT_TOLERANCE, FALLBACK_TOLERANCE};
use rustc_hash::FxHashMap;

type Cell = (i64, i64);

/// Coordinate ↔ point id map for one pass
#[derive(Clone, Debug)]
pub struct PointRegistry {
    /// Insertion order
    entries: Vec<(PointId, Point2D)>,
    by_id: FxHashMap<String, usize>,
    cells: FxHashMap<Cell, Vec<usize>>,
    exact_tolerance: f64,
    fallback_tolerance: f64,
    next_id: u64,
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::with_tolerances(EXACT_TOLERANCE, FALLBACK_TOLERANCE)
    }
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with custom tolerances; both must be positive
    pub fn with_tolerances(exact: f64, fallback: f64) -> Self {
        Self {
            entries: Vec::new(),
            by_id: FxHashMap::default(),
            cells: FxHashMap::default(),
            exact_tolerance: exact,
            fallback_tolerance: fallback,
            next_id: 1,
        }
    }

    /// Grid cell of a point; coordinates beyond the `i64` range saturate
    fn cell(&self, point: &Point2D) -> Cell {
        (
            (point.x / self.exact_tolerance).floor() as i64,
            (point.y / self.exact_tolerance).floor() as i64,
        )
    }

    fn insert(&mut self, id: PointId, point: Point2D) -> usize {
        let index = self.entries.len();
        let cell = self.cell(&point);
        self.by_id.insert(id.0.clone(), index);
        self.cells.entry(cell).or_default().push(index);
        self.entries.push((id, point));
        index
    }

    /// Index of the earliest point within the exact tolerance on both axes
    fn find_exact(&self, point: &Point2D) -> Option<usize> {
        let (cx, cy) = self.cell(point);
        let mut best: Option<usize> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                let cell = (cx.saturating_add(dx), cy.saturating_add(dy));
                let Some(bucket) = self.cells.get(&cell) else {
                    continue;
                };
                for &index in bucket {
                    if self.entries[index].1.within(point, self.exact_tolerance)
                        && best.map_or(true, |b| index < b)
                    {
                        best = Some(index);
                    }
                }
            }
        }

        best
    }

    /// Id for a coordinate, creating one when no point is within the exact
    /// tolerance
    pub fn intern(&mut self, point: Point2D) -> PointId {
        if let Some(index) = self.find_exact(&point) {
            return self.entries[index].0.clone();
        }

        let mut candidate = self.next_id;
        while self.by_id.contains_key(&candidate.to_string()) {
            candidate += 1;
        }
        self.next_id = candidate + 1;

        let id = PointId(candidate.to_string());
        self.insert(id.clone(), point);
        id
    }

    /// Id for a coordinate without creating one
    ///
    /// Tries the exact tolerance first, then the nearest registered point
    /// within the fallback distance. Returns the `"0"` sentinel otherwise.
    pub fn resolve(&self, point: Point2D) -> PointId {
        if let Some(index) = self.find_exact(&point) {
            return self.entries[index].0.clone();
        }

        match self.nearest(point) {
            Some((id, distance)) if distance < self.fallback_tolerance => id.clone(),
            _ => PointId::unresolved(),
        }
    }

    /// Nearest registered point and its distance
    pub fn nearest(&self, point: Point2D) -> Option<(&PointId, f64)> {
        self.entries
            .iter()
            .map(|(id, p)| (id, p.distance_to(&point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Register a point read from text; returns `false` when the id exists
    pub fn register(&mut self, id: impl Into<String>, point: Point2D) -> bool {
        let id = id.into();
        if self.by_id.contains_key(&id) {
            return false;
        }
        self.insert(PointId(id), point);
        true
    }

    /// Coordinate of a point id
    pub fn coordinate(&self, id: &str) -> Option<Point2D> {
        self.by_id.get(id).map(|&index| self.entries[index].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Points in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&PointId, Point2D)> {
        self.entries.iter().map(|(id, p)| (id, *p))
    }

    /// `POINT` records in insertion order
    pub fn to_records(&self) -> Vec<PointRecord> {
        self.entries
            .iter()
            .map(|(id, p)| PointRecord {
                id: id.0.clone(),
                x: p.x,
                y: p.y,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<&'a PointRecord> for PointRegistry {
    fn from_iter<I: IntoIterator<Item = &'a PointRecord>>(iter: I) -> Self {
        let mut registry = Self::new();
        for record in iter {
            registry.register(record.id.clone(), Point2D::new(record.x, record.y));
        }
        registry
    }
}
