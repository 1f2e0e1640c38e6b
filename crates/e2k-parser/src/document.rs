// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory E2K document: the keyed tables of every decoded section

use crate::decoder::{decode_record, DecodedRecord};
use crate::emitter::{EmitOptions, RecordEmitter};
use crate::scanner::{ScanItem, SectionKind, SectionScanner};
use crate::tokenizer::TokenLine;
use e2k_model::{
    AreaAssignment, AreaConnectivity, AssignmentTable, CodecStats, DiaphragmRecord, GridRecord,
    LineAssignment, LineConnectivity, PointRecord, RecordTable, StoryRecord,
};

/// Program name written in the `PROGRAM INFORMATION` section
pub const PROGRAM_NAME: &str = "E2K-EXCHANGE";

/// Decoded E2K content
///
/// Connectivity tables are keyed by element id; a repeated id replaces the
/// earlier record. Assignment tables keep every row in text order.
#[derive(Clone, Debug, Default)]
pub struct E2kDocument {
    /// Top-down, as written
    pub stories: Vec<StoryRecord>,
    pub diaphragms: RecordTable<DiaphragmRecord>,
    pub grids: Vec<GridRecord>,
    pub points: RecordTable<PointRecord>,
    pub lines: RecordTable<LineConnectivity>,
    pub areas: RecordTable<AreaConnectivity>,
    pub line_assigns: AssignmentTable<LineAssignment>,
    pub area_assigns: AssignmentTable<AreaAssignment>,
    pub stats: CodecStats,
}

impl E2kDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode E2K text
    ///
    /// Never fails: lines that do not decode are counted in
    /// `stats.skipped_lines`, unknown sections in `stats.ignored_sections`.
    pub fn parse(content: &str) -> Self {
        let mut document = Self::new();
        let mut section = SectionKind::Preamble;

        for item in SectionScanner::new(content) {
            match item {
                ScanItem::Header { kind, .. } => {
                    if let SectionKind::Other(name) = &kind {
                        log::debug!("[E2K] Ignoring section '{}'", name);
                        document.stats.ignored_sections.push(name.clone());
                    }
                    section = kind;
                }
                ScanItem::Data { number, text } => {
                    document.stats.lines += 1;
                    document.decode_line(&section, number, text);
                }
            }
        }

        log::debug!(
            "[E2K] Parsed {} lines: {} records, {} skipped",
            document.stats.lines,
            document.stats.records,
            document.stats.skipped()
        );
        document
    }

    fn decode_line(&mut self, section: &SectionKind, number: usize, text: &str) {
        let Some(keyword) = section.record_keyword() else {
            return;
        };

        let line = match TokenLine::parse(text) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("[E2K] Line {}: {}", number, e);
                self.stats.skipped_lines.push(number);
                return;
            }
        };

        // Sections also hold companion records (GRIDSYSTEM, ...) we do not model
        if !line.has_keyword(keyword) {
            log::trace!("[E2K] Line {}: not a {} record", number, keyword);
            return;
        }

        match decode_record(section, &line) {
            Some(record) => {
                self.stats.records += 1;
                self.push(record);
            }
            None => {
                log::warn!("[E2K] Line {}: malformed {} record", number, keyword);
                self.stats.skipped_lines.push(number);
            }
        }
    }

    /// Add a decoded record to its table
    pub fn push(&mut self, record: DecodedRecord) {
        let replaced = match record {
            DecodedRecord::Point(r) => self.points.insert(r),
            DecodedRecord::Line(r) => self.lines.insert(r),
            DecodedRecord::Area(r) => self.areas.insert(r),
            DecodedRecord::Diaphragm(r) => self.diaphragms.insert(r),
            DecodedRecord::LineAssign(r) => {
                self.line_assigns.push(r);
                false
            }
            DecodedRecord::AreaAssign(r) => {
                self.area_assigns.push(r);
                false
            }
            DecodedRecord::Story(r) => {
                self.stories.push(r);
                false
            }
            DecodedRecord::Grid(r) => {
                self.grids.push(r);
                false
            }
        };
        if replaced {
            log::debug!("[E2K] Duplicate record id replaced the earlier one");
        }
    }

    /// Whether any model section produced records
    pub fn has_model_content(&self) -> bool {
        !(self.points.is_empty()
            && self.lines.is_empty()
            && self.areas.is_empty()
            && self.stories.is_empty()
            && self.line_assigns.is_empty()
            && self.area_assigns.is_empty())
    }

    /// Write the document as E2K text
    ///
    /// Sections are written in a fixed order; story, diaphragm and grid
    /// sections are left out when empty. The text ends with the
    /// `END OF MODEL FILE` marker.
    pub fn to_e2k(&self, options: &EmitOptions) -> String {
        let mut emitter = RecordEmitter::new(options);

        emitter.section(&SectionKind::ProgramInfo);
        emitter.program(PROGRAM_NAME, env!("CARGO_PKG_VERSION"));

        if !self.stories.is_empty() {
            emitter.section(&SectionKind::Stories);
            for story in &self.stories {
                emitter.story(story);
            }
        }

        if !self.diaphragms.is_empty() {
            emitter.section(&SectionKind::Diaphragms);
            for diaphragm in self.diaphragms.iter() {
                emitter.diaphragm(diaphragm);
            }
        }

        if !self.grids.is_empty() {
            emitter.section(&SectionKind::Grids);
            for grid in &self.grids {
                emitter.grid(grid);
            }
        }

        emitter.section(&SectionKind::Points);
        for point in self.points.iter() {
            emitter.point(point);
        }

        emitter.section(&SectionKind::LineConnectivities);
        for line in self.lines.iter() {
            emitter.line(line);
        }

        emitter.section(&SectionKind::AreaConnectivities);
        for area in self.areas.iter() {
            emitter.area(area);
        }

        emitter.section(&SectionKind::LineAssigns);
        for (_, rows) in self.line_assigns.iter() {
            for row in rows {
                emitter.line_assign(row);
            }
        }

        emitter.section(&SectionKind::AreaAssigns);
        for (_, rows) in self.area_assigns.iter() {
            for row in rows {
                emitter.area_assign(row);
            }
        }

        emitter.section(&SectionKind::End);
        emitter.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"$ PROGRAM INFORMATION
  PROGRAM  "ETABS"  VERSION "9.7.4"

$ STORIES - IN SEQUENCE FROM TOP
  STORY "Story2"  HEIGHT 144
  STORY "Story1"  HEIGHT 144
  STORY "Base"  ELEV 0

$ GRIDS
  GRIDSYSTEM "G1"  TYPE "CARTESIAN"
  GRID "G1"  LABEL "A"  DIR "X"  COORD 0

$ POINT COORDINATES
  POINT "1"  0  0
  POINT "2"  240  0
  POINT "3"  240

$ LINE CONNECTIVITIES
  LINE  "B1"  BEAM  "1"  "2"  0
  LINE  "C1"  COLUMN  "1"  "1"  1

$ LINE ASSIGNS
  LINEASSIGN  "B1"  "Story2"  SECTION  "W12X26"
  LINEASSIGN  "C1"  "Story1"  SECTION  "W14X90"
  LINEASSIGN  "C1"  "Story2"  SECTION  "W14X90"

$ LOAD PATTERNS
  LOADPATTERN "DEAD"  TYPE  "Dead"

$ END OF MODEL FILE
"#;

    #[test]
    fn test_parse_sample() {
        let doc = E2kDocument::parse(SAMPLE);

        assert_eq!(doc.stories.len(), 3);
        assert_eq!(doc.grids.len(), 1);
        assert_eq!(doc.points.len(), 2);
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.line_assigns.len(), 2);
        assert_eq!(doc.line_assigns.rows("C1").len(), 2);

        // POINT "3" has no y
        assert_eq!(doc.stats.skipped_lines, vec![16]);
        assert_eq!(doc.stats.ignored_sections, vec!["LOAD PATTERNS".to_string()]);
        assert!(doc.has_model_content());
    }

    #[test]
    fn test_duplicate_point_replaces() {
        let doc = E2kDocument::parse("$ POINT COORDINATES\n  POINT \"1\" 0 0\n  POINT \"1\" 5 5\n");
        assert_eq!(doc.points.len(), 1);
        assert_eq!(doc.points.get("1").map(|p| p.x), Some(5.0));
    }

    #[test]
    fn test_no_model_content() {
        let doc = E2kDocument::parse("just some text\n$ LOADS\n  LOAD 1\n");
        assert!(!doc.has_model_content());
        assert_eq!(doc.stats.records, 0);
        assert!(doc.stats.skipped_lines.is_empty());
    }

    #[test]
    fn test_emit_section_order() {
        let doc = E2kDocument::parse(SAMPLE);
        let text = doc.to_e2k(&EmitOptions::default());

        let headers: Vec<_> = text.lines().filter(|l| l.starts_with('$')).collect();
        assert_eq!(
            headers,
            vec![
                "$ PROGRAM INFORMATION",
                "$ STORIES - IN SEQUENCE FROM TOP",
                "$ GRIDS",
                "$ POINT COORDINATES",
                "$ LINE CONNECTIVITIES",
                "$ AREA CONNECTIVITIES",
                "$ LINE ASSIGNS",
                "$ AREA ASSIGNS",
                "$ END OF MODEL FILE",
            ]
        );
        assert!(text.ends_with("$ END OF MODEL FILE\n"));
    }

    #[test]
    fn test_emit_then_parse_keeps_tables() {
        let doc = E2kDocument::parse(SAMPLE);
        let again = E2kDocument::parse(&doc.to_e2k(&EmitOptions::default()));

        assert_eq!(again.stories, doc.stories);
        assert_eq!(again.grids, doc.grids);
        assert_eq!(again.points.len(), doc.points.len());
        assert_eq!(again.lines.get("C1"), doc.lines.get("C1"));
        assert_eq!(again.line_assigns.rows("C1"), doc.line_assigns.rows("C1"));
        assert!(again.stats.skipped_lines.is_empty());
    }
}
