// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-pass reports: what was produced, what was skipped and why

use crate::{ElementContainer, ElementId, ElementKind, LevelRef, Point2D, Result, SkipReason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stage of one exchange call
///
/// Linear: `Idle → ParsingSections → TableBuilt → Resolving → Materialized →
/// Emitting → Done`. Import stops at `Materialized` before `Done`; export
/// passes through `Emitting`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ExchangeStage {
    #[default]
    Idle,
    ParsingSections,
    TableBuilt,
    Resolving,
    Materialized,
    Emitting,
    Done,
}

impl fmt::Display for ExchangeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangeStage::Idle => "idle",
            ExchangeStage::ParsingSections => "parsing sections",
            ExchangeStage::TableBuilt => "table built",
            ExchangeStage::Resolving => "resolving",
            ExchangeStage::Materialized => "materialized",
            ExchangeStage::Emitting => "emitting",
            ExchangeStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Line-level statistics from the codec
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodecStats {
    /// Data lines read, headers excluded
    pub lines: usize,
    /// Lines decoded into records
    pub records: usize,
    /// 1-based numbers of data lines in known sections that failed to decode
    pub skipped_lines: Vec<usize>,
    /// Section headers the codec does not interpret
    pub ignored_sections: Vec<String>,
}

impl CodecStats {
    pub fn skipped(&self) -> usize {
        self.skipped_lines.len()
    }
}

/// One element or row left out of a pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub kind: ElementKind,
    /// E2K element id on import, host element id on export
    pub source: String,
    /// Story of the offending assignment row, when there is one
    pub story: Option<String>,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.story {
            Some(story) => write!(f, "{} {} @ {}: {}", self.kind, self.source, story, self.reason),
            None => write!(f, "{} {}: {}", self.kind, self.source, self.reason),
        }
    }
}

/// Outcome details of an E2K → model import
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub stage: ExchangeStage,
    pub codec: CodecStats,
    /// Elements materialized per kind
    pub created: BTreeMap<ElementKind, usize>,
    pub skipped: Vec<SkippedEntry>,
    /// Connectivity records no assignment row refers to
    pub unassigned: Vec<String>,
}

impl ImportReport {
    /// Skips of one kind
    pub fn skipped_of(&self, kind: ElementKind) -> impl Iterator<Item = &SkippedEntry> {
        self.skipped.iter().filter(move |s| s.kind == kind)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A coordinate that matched no registered point within tolerance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedPoint {
    pub element: ElementId,
    pub kind: ElementKind,
    pub point: Point2D,
}

/// Outcome details of a model → E2K export
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExportReport {
    pub stage: ExchangeStage,
    /// Emitted E2K id per host element
    pub ids: BTreeMap<ElementId, String>,
    pub point_count: usize,
    pub skipped: Vec<SkippedEntry>,
    /// Points written as the sentinel id `"0"`
    pub unresolved_points: Vec<UnresolvedPoint>,
    /// Whether any floor fell back to the default diaphragm
    pub used_default_diaphragm: bool,
}

impl ExportReport {
    pub fn emitted_id(&self, element: ElementId) -> Option<&str> {
        self.ids.get(&element).map(String::as_str)
    }

    pub fn skipped_of(&self, kind: ElementKind) -> impl Iterator<Item = &SkippedEntry> {
        self.skipped.iter().filter(move |s| s.kind == kind)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of an import call
#[derive(Clone, Debug, Default)]
pub struct ImportOutcome {
    pub elements: ElementContainer,
    /// Levels the elements refer to, elevation-sorted
    pub levels: Vec<LevelRef>,
    pub report: ImportReport,
}

/// Result of an export call
#[derive(Clone, Debug, Default)]
pub struct ExportOutcome {
    pub text: String,
    pub report: ExportReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert!(ExchangeStage::Idle < ExchangeStage::ParsingSections);
        assert!(ExchangeStage::Materialized < ExchangeStage::Emitting);
        assert!(ExchangeStage::Emitting < ExchangeStage::Done);
    }

    #[test]
    fn test_skipped_entry_display() {
        let entry = SkippedEntry {
            kind: ElementKind::Beam,
            source: "B7".to_string(),
            story: Some("Story9".to_string()),
            reason: SkipReason::UnknownStory("Story9".to_string()),
        };
        assert_eq!(
            entry.to_string(),
            "beam B7 @ Story9: story \"Story9\" does not match any level"
        );
    }

    #[test]
    fn test_report_json() {
        let mut report = ImportReport::default();
        report.created.insert(ElementKind::Beam, 2);
        report.skipped.push(SkippedEntry {
            kind: ElementKind::Floor,
            source: "F1".to_string(),
            story: None,
            reason: SkipReason::degenerate("2 points"),
        });

        let json = report.to_json().unwrap();
        assert!(json.contains("\"Beam\": 2"));
        assert!(json.contains("DegenerateGeometry"));
    }
}
