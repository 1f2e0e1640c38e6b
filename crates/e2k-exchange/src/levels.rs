// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Level resolver
//!
//! Story names reach the engine in several spellings (`Story3`, `STORY3`,
//! `3`, `Base`, `0`). Every name goes through [`normalize_story_name`] both
//! when a level is registered and when it is looked up, so one key per level
//! is enough.

use e2k_model::{LevelId, LevelRef, StoryRecord};
use rustc_hash::FxHashMap;

/// Lookup key for a story name
///
/// Trims and uppercases, strips a leading `STORY` when something follows it,
/// and maps `BASE` to `0`.
pub fn normalize_story_name(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    let stripped = match upper.strip_prefix("STORY") {
        Some(rest) if !rest.trim().is_empty() => rest.trim(),
        _ => upper.as_str(),
    };
    if stripped == "BASE" {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Levels from a top-down `STORIES` section
///
/// Elevations accumulate bottom-up: a story with `ELEV` takes it, otherwise
/// it sits `HEIGHT` above the story below. Ids are assigned bottom-up from 1.
pub fn levels_from_stories(stories: &[StoryRecord]) -> Vec<LevelRef> {
    let mut levels = Vec::with_capacity(stories.len());
    let mut below = 0.0;

    for (i, story) in stories.iter().rev().enumerate() {
        let elevation = match story.elevation {
            Some(elevation) => elevation,
            None => below + story.height.unwrap_or(0.0),
        };
        levels.push(LevelRef::new(LevelId(i as u64 + 1), story.name.clone(), elevation));
        below = elevation;
    }

    levels
}

/// Elevation-sorted level list with name and id lookup
#[derive(Clone, Debug, Default)]
pub struct LevelResolver {
    sorted: Vec<LevelRef>,
    by_key: FxHashMap<String, usize>,
    by_id: FxHashMap<LevelId, usize>,
}

impl LevelResolver {
    /// Build from any level list; the first level wins a repeated name or id
    pub fn new(levels: impl IntoIterator<Item = LevelRef>) -> Self {
        let registered: Vec<LevelRef> = levels.into_iter().collect();
        let mut order: Vec<usize> = (0..registered.len()).collect();
        order.sort_by(|&a, &b| registered[a].elevation.total_cmp(&registered[b].elevation));

        // registration index -> position in the sorted list
        let mut position = vec![0; registered.len()];
        for (index, &original) in order.iter().enumerate() {
            position[original] = index;
        }
        let sorted: Vec<LevelRef> = order.iter().map(|&i| registered[i].clone()).collect();

        let mut by_key = FxHashMap::default();
        let mut by_id = FxHashMap::default();

        // keys and ids are claimed in registration order
        for (original, level) in registered.iter().enumerate() {
            let index = position[original];
            let key = normalize_story_name(&level.name);
            if let Some(&existing) = by_key.get(&key) {
                let first: &LevelRef = &sorted[existing];
                log::warn!(
                    "[Levels] '{}' and '{}' share the key '{}'; keeping '{}'",
                    first.name,
                    level.name,
                    key,
                    first.name
                );
            } else {
                by_key.insert(key, index);
            }
            by_id.entry(level.id).or_insert(index);
        }

        log::debug!("[Levels] {} levels registered", sorted.len());
        Self {
            sorted,
            by_key,
            by_id,
        }
    }

    /// Build from a top-down `STORIES` section
    pub fn from_stories(stories: &[StoryRecord]) -> Self {
        Self::new(levels_from_stories(stories))
    }

    /// Level for a story name in any spelling
    pub fn resolve(&self, name: &str) -> Option<&LevelRef> {
        self.by_key
            .get(&normalize_story_name(name))
            .map(|&index| &self.sorted[index])
    }

    pub fn get(&self, id: LevelId) -> Option<&LevelRef> {
        self.index_of(id).map(|index| &self.sorted[index])
    }

    /// Position in the elevation-sorted list
    pub fn index_of(&self, id: LevelId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Next level up; the top level returns itself
    pub fn level_above(&self, id: LevelId) -> Option<&LevelRef> {
        let index = self.index_of(id)?;
        Some(&self.sorted[(index + 1).min(self.sorted.len() - 1)])
    }

    /// Next level down; the bottom level returns itself
    pub fn level_below(&self, id: LevelId) -> Option<&LevelRef> {
        let index = self.index_of(id)?;
        Some(&self.sorted[index.saturating_sub(1)])
    }

    /// Next level up, `None` at the top
    pub fn strictly_above(&self, id: LevelId) -> Option<&LevelRef> {
        let index = self.index_of(id)?;
        self.sorted.get(index + 1)
    }

    /// Levels in ascending elevation
    pub fn levels(&self) -> &[LevelRef] {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// `STORY` records, top-down
    ///
    /// The bottom level is written with its elevation; every other level
    /// with its height above the level below.
    pub fn to_story_records(&self) -> Vec<StoryRecord> {
        let mut stories = Vec::with_capacity(self.sorted.len());

        for (index, level) in self.sorted.iter().enumerate().rev() {
            let story = match index {
                0 => StoryRecord {
                    name: level.name.clone(),
                    height: None,
                    elevation: Some(level.elevation),
                    master: None,
                },
                _ => {
                    let height = level.elevation - self.sorted[index - 1].elevation;
                    StoryRecord {
                        name: level.name.clone(),
                        height: Some((height * 1e9).round() / 1e9),
                        elevation: None,
                        master: None,
                    }
                }
            };
            stories.push(story);
        }

        stories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn building() -> LevelResolver {
        // deliberately unsorted
        LevelResolver::new(vec![
            LevelRef::new(LevelId(30), "Story3", 288.0),
            LevelRef::new(LevelId(10), "Base", 0.0),
            LevelRef::new(LevelId(20), "Story1", 144.0),
            LevelRef::new(LevelId(25), "Story2", 216.0),
        ])
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_story_name("Story3"), "3");
        assert_eq!(normalize_story_name(" STORY 3 "), "3");
        assert_eq!(normalize_story_name("3"), "3");
        assert_eq!(normalize_story_name("Base"), "0");
        assert_eq!(normalize_story_name("0"), "0");
        assert_eq!(normalize_story_name("Story"), "STORY");
        assert_eq!(normalize_story_name("Roof"), "ROOF");
    }

    #[test]
    fn test_name_equivalence() {
        let levels = building();
        assert_eq!(levels.resolve("Story3").map(|l| l.id), Some(LevelId(30)));
        assert_eq!(levels.resolve("3").map(|l| l.id), Some(LevelId(30)));
        assert_eq!(levels.resolve("story3").map(|l| l.id), Some(LevelId(30)));
        assert_eq!(levels.resolve("Base").map(|l| l.id), Some(LevelId(10)));
        assert_eq!(levels.resolve("0").map(|l| l.id), Some(LevelId(10)));
        assert!(levels.resolve("Story9").is_none());
    }

    #[test]
    fn test_sorted_and_neighbours() {
        let levels = building();
        let names: Vec<_> = levels.levels().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Base", "Story1", "Story2", "Story3"]);

        assert_eq!(levels.index_of(LevelId(25)), Some(2));
        assert_eq!(levels.level_above(LevelId(20)).map(|l| l.id), Some(LevelId(25)));
        assert_eq!(levels.level_below(LevelId(20)).map(|l| l.id), Some(LevelId(10)));

        // boundaries return the level itself
        assert_eq!(levels.level_below(LevelId(10)).map(|l| l.id), Some(LevelId(10)));
        assert_eq!(levels.level_above(LevelId(30)).map(|l| l.id), Some(LevelId(30)));
        assert!(levels.strictly_above(LevelId(30)).is_none());

        assert!(levels.level_above(LevelId(99)).is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let levels = LevelResolver::new(vec![
            LevelRef::new(LevelId(1), "Story1", 0.0),
            LevelRef::new(LevelId(2), "1", 100.0),
        ]);
        assert_eq!(levels.resolve("1").map(|l| l.id), Some(LevelId(1)));
        assert_eq!(levels.len(), 2);

        // registration order decides, not elevation
        let levels = LevelResolver::new(vec![
            LevelRef::new(LevelId(2), "1", 100.0),
            LevelRef::new(LevelId(1), "Story1", 0.0),
        ]);
        assert_eq!(levels.resolve("1").map(|l| l.id), Some(LevelId(2)));
        assert_eq!(levels.levels()[0].id, LevelId(1));
        assert_eq!(levels.index_of(LevelId(2)), Some(1));
    }

    #[test]
    fn test_levels_from_stories() {
        let stories = vec![
            StoryRecord {
                name: "Story2".to_string(),
                height: Some(120.0),
                elevation: None,
                master: None,
            },
            StoryRecord {
                name: "Story1".to_string(),
                height: Some(168.0),
                elevation: None,
                master: Some(true),
            },
            StoryRecord {
                name: "Base".to_string(),
                height: None,
                elevation: Some(-12.0),
                master: None,
            },
        ];

        let levels = levels_from_stories(&stories);
        assert_eq!(levels[0].name, "Base");
        assert_eq!(levels[0].id, LevelId(1));
        assert_relative_eq!(levels[1].elevation, 156.0);
        assert_relative_eq!(levels[2].elevation, 276.0);
    }

    #[test]
    fn test_story_records_round_trip() {
        let levels = building();
        let stories = levels.to_story_records();
        assert_eq!(stories[0].name, "Story3");
        assert_eq!(stories[0].height, Some(72.0));
        assert_eq!(stories[3].elevation, Some(0.0));

        let back = LevelResolver::from_stories(&stories);
        for (a, b) in back.levels().iter().zip(levels.levels()) {
            assert_eq!(a.name, b.name);
            assert_relative_eq!(a.elevation, b.elevation);
        }
    }
}
