// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Name/id tables supplied by the host application
//!
//! The engine only needs `(id, name)` pairs for properties and diaphragms
//! and `(id, name, elevation)` triples for levels, never the richer host
//! objects behind them.

use crate::{DiaphragmId, LevelRef, PropertyId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Lookup of display names by host id and back
pub trait NameLookup<Id> {
    /// Display name for an id
    fn name_of(&self, id: Id) -> Option<&str>;

    /// Id for a display name (case-insensitive)
    fn id_of(&self, name: &str) -> Option<Id>;
}

/// Bidirectional id/name table
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "Id: Serialize",
    deserialize = "Id: Deserialize<'de> + Copy + Eq + Hash"
))]
#[serde(from = "Vec<(Id, String)>", into = "Vec<(Id, String)>")]
pub struct NamedTable<Id: Copy + Eq + Hash> {
    entries: Vec<(Id, String)>,
    by_id: FxHashMap<Id, usize>,
    by_name: FxHashMap<String, usize>,
}

impl<Id: Copy + Eq + Hash> Default for NamedTable<Id> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_id: FxHashMap::default(),
            by_name: FxHashMap::default(),
        }
    }
}

impl<Id: Copy + Eq + Hash> NamedTable<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; the first entry wins for a repeated id or name
    pub fn insert(&mut self, id: Id, name: impl Into<String>) {
        let name = name.into();
        let pos = self.entries.len();
        self.by_id.entry(id).or_insert(pos);
        self.by_name.entry(name.to_uppercase()).or_insert(pos);
        self.entries.push((id, name));
    }

    pub fn with(mut self, id: Id, name: impl Into<String>) -> Self {
        self.insert(id, name);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<Id: Copy + Eq + Hash> NameLookup<Id> for NamedTable<Id> {
    fn name_of(&self, id: Id) -> Option<&str> {
        self.by_id
            .get(&id)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    fn id_of(&self, name: &str) -> Option<Id> {
        self.by_name
            .get(&name.trim().to_uppercase())
            .map(|&pos| self.entries[pos].0)
    }
}

impl<Id: Copy + Eq + Hash> From<Vec<(Id, String)>> for NamedTable<Id> {
    fn from(entries: Vec<(Id, String)>) -> Self {
        let mut table = Self::new();
        for (id, name) in entries {
            table.insert(id, name);
        }
        table
    }
}

impl<Id: Copy + Eq + Hash> From<NamedTable<Id>> for Vec<(Id, String)> {
    fn from(table: NamedTable<Id>) -> Self {
        table.entries
    }
}

/// Frame, wall or floor property table
pub type PropertyTable = NamedTable<PropertyId>;

/// Diaphragm definition table
pub type DiaphragmTable = NamedTable<DiaphragmId>;

/// Everything the host hands the engine besides elements
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCatalog {
    pub levels: Vec<LevelRef>,
    pub frame_sections: PropertyTable,
    pub wall_sections: PropertyTable,
    pub floor_sections: PropertyTable,
    pub diaphragms: DiaphragmTable,
}

impl HostCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LevelRef) -> Self {
        self.levels.push(level);
        self
    }

    pub fn with_levels(mut self, levels: impl IntoIterator<Item = LevelRef>) -> Self {
        self.levels.extend(levels);
        self
    }

    pub fn with_frame_section(mut self, id: PropertyId, name: impl Into<String>) -> Self {
        self.frame_sections.insert(id, name);
        self
    }

    pub fn with_wall_section(mut self, id: PropertyId, name: impl Into<String>) -> Self {
        self.wall_sections.insert(id, name);
        self
    }

    pub fn with_floor_section(mut self, id: PropertyId, name: impl Into<String>) -> Self {
        self.floor_sections.insert(id, name);
        self
    }

    pub fn with_diaphragm(mut self, id: DiaphragmId, name: impl Into<String>) -> Self {
        self.diaphragms.insert(id, name);
        self
    }
}
