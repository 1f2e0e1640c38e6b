// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Span expander
//!
//! Turns an element's base and top level into the per-story rows written to
//! the assignment sections. A column from base index `i` to top index `j`
//! gets one row per level `i+1..=j`; the lowest row is the base row.

use crate::levels::LevelResolver;
use crate::options::SpanFallback;
use e2k_model::{LevelId, LevelRef, SkipReason};
use serde::{Deserialize, Serialize};

/// Which attribute set a span row receives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanRow {
    Base,
    Intermediate,
}

/// One assignment row of a span
#[derive(Clone, Debug, PartialEq)]
pub struct SpanStep<'l> {
    pub level: &'l LevelRef,
    pub row: SpanRow,
}

impl SpanStep<'_> {
    pub fn is_base(&self) -> bool {
        self.row == SpanRow::Base
    }
}

/// Per-story row expansion over a level resolver
pub struct SpanExpander<'l> {
    levels: &'l LevelResolver,
    fallback: SpanFallback,
}

impl<'l> SpanExpander<'l> {
    pub fn new(levels: &'l LevelResolver, fallback: SpanFallback) -> Self {
        Self { levels, fallback }
    }

    /// Single base row for beams, floors and openings
    pub fn single(&self, level: LevelId) -> Result<Vec<SpanStep<'l>>, SkipReason> {
        let level = self
            .levels
            .get(level)
            .ok_or(SkipReason::UnknownLevel(level))?;
        Ok(vec![SpanStep {
            level,
            row: SpanRow::Base,
        }])
    }

    /// Rows for an element from `base` up to `top`
    ///
    /// `base == top` yields one base row at that level. A top below the base
    /// is handled by the configured [`SpanFallback`].
    pub fn expand(&self, base: LevelId, top: LevelId) -> Result<Vec<SpanStep<'l>>, SkipReason> {
        let levels: &'l LevelResolver = self.levels;
        let i = levels.index_of(base).ok_or(SkipReason::UnknownLevel(base))?;
        let j = levels.index_of(top).ok_or(SkipReason::UnknownLevel(top))?;
        let sorted = levels.levels();

        if i == j {
            return self.single(base);
        }

        if j > i {
            let steps: Vec<_> = sorted[i + 1..=j]
                .iter()
                .enumerate()
                .map(|(n, level)| SpanStep {
                    level,
                    row: if n == 0 {
                        SpanRow::Base
                    } else {
                        SpanRow::Intermediate
                    },
                })
                .collect();
            log::trace!(
                "[Span] {} -> {}: {} rows",
                sorted[i].name,
                sorted[j].name,
                steps.len()
            );
            return Ok(steps);
        }

        match self.fallback {
            SpanFallback::BaseRowOnly => {
                log::warn!(
                    "[Span] Top '{}' is below base '{}'; writing the base row only",
                    sorted[j].name,
                    sorted[i].name
                );
                self.single(base)
            }
            SpanFallback::AllLevels => {
                log::warn!(
                    "[Span] Top '{}' is below base '{}'; writing a row for every level",
                    sorted[j].name,
                    sorted[i].name
                );
                Ok(sorted
                    .iter()
                    .enumerate()
                    .map(|(n, level)| SpanStep {
                        level,
                        row: if n == 0 {
                            SpanRow::Base
                        } else {
                            SpanRow::Intermediate
                        },
                    })
                    .collect())
            }
        }
    }

    /// `1` when the first row sits above the base level, else `0`
    pub fn story_offset(steps: &[SpanStep<'_>], base: LevelId) -> i32 {
        match steps.first() {
            Some(step) if step.level.id != base => 1,
            _ => 0,
        }
    }
}
