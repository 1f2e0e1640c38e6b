// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! E2K record emitter
//!
//! Writes records in the two-space separated layout, one record per line,
//! indented under their `$` section header.

use crate::scanner::SectionKind;
use e2k_model::{
    AreaAssignment, AreaAssignmentBody, AreaConnectivity, AreaKind, DiaphragmRecord, FieldValue,
    GridPlacement, GridRecord, LineAssignment, LineConnectivity, MeshSpec, PointRecord,
    StoryRecord,
};
use serde::{Deserialize, Serialize};

const FIELD_GAP: &str = "  ";

/// Layout options for written E2K text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Digits after the decimal point for plan coordinates
    pub coordinate_precision: usize,
    /// Spaces before each data line
    pub indent: usize,
    /// Repeat the first point of an open `PANEL` polygon at its end
    pub close_panels: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            coordinate_precision: 10,
            indent: 2,
            close_panels: true,
        }
    }
}

impl EmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coordinate_precision(mut self, digits: usize) -> Self {
        self.coordinate_precision = digits;
        self
    }

    pub fn with_indent(mut self, spaces: usize) -> Self {
        self.indent = spaces;
        self
    }

    pub fn with_close_panels(mut self, close: bool) -> Self {
        self.close_panels = close;
        self
    }
}

/// Fixed-precision coordinate; negative zero prints as zero
pub fn format_coordinate(value: f64, precision: usize) -> String {
    let text = format!("{:.*}", precision, value);
    strip_negative_zero(text)
}

/// Shortest round-tripping form for heights, elevations and counts
pub fn format_number(value: f64) -> String {
    strip_negative_zero(format!("{}", value))
}

fn strip_negative_zero(text: String) -> String {
    match text.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => text,
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn yes_no_upper(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

/// Buffered E2K writer
pub struct RecordEmitter<'o> {
    out: String,
    options: &'o EmitOptions,
}

impl<'o> RecordEmitter<'o> {
    pub fn new(options: &'o EmitOptions) -> Self {
        Self {
            out: String::with_capacity(4096),
            options,
        }
    }

    /// Take the written text
    pub fn finish(self) -> String {
        self.out
    }

    // ------------------------------------------------------------------------
    // Line building
    // ------------------------------------------------------------------------

    fn begin(&mut self, keyword: &str) {
        for _ in 0..self.options.indent {
            self.out.push(' ');
        }
        self.out.push_str(keyword);
    }

    fn quoted(&mut self, value: &str) {
        self.out.push_str(FIELD_GAP);
        self.out.push('"');
        self.out.push_str(value);
        self.out.push('"');
    }

    fn bare(&mut self, value: &str) {
        self.out.push_str(FIELD_GAP);
        self.out.push_str(value);
    }

    fn key_quoted(&mut self, key: &str, value: &str) {
        self.bare(key);
        self.quoted(value);
    }

    fn key_bare(&mut self, key: &str, value: &str) {
        self.bare(key);
        self.bare(value);
    }

    fn coordinate(&mut self, value: f64) {
        let text = format_coordinate(value, self.options.coordinate_precision);
        self.bare(&text);
    }

    fn extras(&mut self, extra: &[(String, FieldValue)]) {
        for (key, value) in extra {
            let text = value.to_string();
            self.key_bare(key, &text);
        }
    }

    fn end(&mut self) {
        self.out.push('\n');
    }

    // ------------------------------------------------------------------------
    // Sections and records
    // ------------------------------------------------------------------------

    /// `$ HEADER` line, preceded by a blank line unless first
    pub fn section(&mut self, kind: &SectionKind) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str("$ ");
        self.out.push_str(kind.header());
        self.out.push('\n');
    }

    /// `PROGRAM "name" VERSION "v"`
    pub fn program(&mut self, name: &str, version: &str) {
        self.begin("PROGRAM");
        self.quoted(name);
        self.key_quoted("VERSION", version);
        self.end();
    }

    pub fn story(&mut self, story: &StoryRecord) {
        self.begin("STORY");
        self.quoted(&story.name);
        if let Some(height) = story.height {
            self.key_bare("HEIGHT", &format_number(height));
        }
        if let Some(elevation) = story.elevation {
            self.key_bare("ELEV", &format_number(elevation));
        }
        if let Some(master) = story.master {
            self.key_quoted("MASTERSTORY", yes_no(master));
        }
        self.end();
    }

    pub fn diaphragm(&mut self, diaphragm: &DiaphragmRecord) {
        self.begin("DIAPHRAGM");
        self.quoted(&diaphragm.name);
        self.key_bare("TYPE", &diaphragm.rigidity);
        self.end();
    }

    pub fn grid(&mut self, grid: &GridRecord) {
        self.begin("GRID");
        self.quoted(&grid.system);
        self.key_quoted("LABEL", &grid.label);
        match &grid.placement {
            GridPlacement::Axis {
                direction,
                coordinate,
            } => {
                self.key_quoted("DIR", direction);
                self.bare("COORD");
                self.coordinate(*coordinate);
            }
            GridPlacement::General { x1, y1, x2, y2 } => {
                self.key_quoted("DIR", "GENERAL");
                for (key, value) in [("X1", x1), ("Y1", y1), ("X2", x2), ("Y2", y2)] {
                    self.bare(key);
                    self.coordinate(*value);
                }
            }
        }
        self.end();
    }

    pub fn point(&mut self, point: &PointRecord) {
        self.begin("POINT");
        self.quoted(&point.id);
        self.coordinate(point.x);
        self.coordinate(point.y);
        self.end();
    }

    pub fn line(&mut self, line: &LineConnectivity) {
        self.begin("LINE");
        self.quoted(&line.id);
        self.bare(line.kind.keyword());
        self.quoted(&line.start);
        self.quoted(&line.end);
        self.bare(&line.story_offset.to_string());
        self.end();
    }

    /// `AREA` record; open `PANEL` polygons are closed when configured
    pub fn area(&mut self, area: &AreaConnectivity) {
        let mut points: Vec<&str> = area.points.iter().map(String::as_str).collect();
        let mut offsets = area.story_offsets.clone();

        if self.options.close_panels && area.kind == AreaKind::Panel {
            if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
                if first != last {
                    points.push(first);
                    offsets.push(offsets.first().copied().unwrap_or(0));
                }
            }
        }

        self.begin("AREA");
        self.quoted(&area.id);
        self.bare(area.kind.keyword());
        self.bare(&points.len().to_string());
        for point in &points {
            self.quoted(point);
        }
        for offset in &offsets {
            self.bare(&offset.to_string());
        }
        self.end();
    }

    pub fn line_assign(&mut self, row: &LineAssignment) {
        self.begin("LINEASSIGN");
        self.quoted(&row.id);
        self.quoted(&row.story);
        self.key_quoted("SECTION", &row.section);
        if let Some(release) = &row.release {
            self.key_quoted("RELEASE", release);
        }
        match row.mesh {
            Some(MeshSpec::MaxStationSpacing(spacing)) => {
                self.key_bare("MAXSTASPC", &format_number(spacing))
            }
            Some(MeshSpec::MinStations(count)) => self.key_bare("MINNUMSTA", &count.to_string()),
            None => {}
        }
        if let Some(auto) = row.auto_mesh {
            self.key_quoted("AUTOMESH", yes_no_upper(auto));
        }
        if let Some(at) = row.mesh_at_intersections {
            self.key_quoted("MESHATINTERSECTIONS", yes_no_upper(at));
        }
        self.extras(&row.extra);
        self.end();
    }

    pub fn area_assign(&mut self, row: &AreaAssignment) {
        self.begin("AREAASSIGN");
        self.quoted(&row.id);
        self.quoted(&row.story);
        match &row.body {
            AreaAssignmentBody::Section(attrs) => {
                self.key_quoted("SECTION", &attrs.section);
                if let Some(mesh) = &attrs.mesh_type {
                    self.key_quoted("OBJMESHTYPE", mesh);
                }
                if let Some(restraint) = attrs.add_restraint {
                    self.key_quoted("ADDRESTRAINT", yes_no(restraint));
                }
                if let Some(cardinal) = &attrs.cardinal_point {
                    self.key_quoted("CARDINALPOINT", cardinal);
                }
                if let Some(transform) = attrs.transform_stiffness {
                    self.key_quoted("TRANSFORMSTIFFNESSFOROFFSETS", yes_no(transform));
                }
                self.extras(&attrs.extra);
            }
            AreaAssignmentBody::Diaphragm(name) => self.key_quoted("DIAPH", name),
            AreaAssignmentBody::Opening => self.key_quoted("OPENING", "Yes"),
        }
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use e2k_model::{AreaSectionAssignment, LineKind};

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(120.0, 10), "120.0000000000");
        assert_eq!(format_coordinate(-0.0, 10), "0.0000000000");
        assert_eq!(format_coordinate(-1e-12, 10), "0.0000000000");
        assert_eq!(format_coordinate(-2.5, 2), "-2.50");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(144.0), "144");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_point_and_line_layout() {
        let options = EmitOptions::default();
        let mut emitter = RecordEmitter::new(&options);
        emitter.point(&PointRecord {
            id: "1".to_string(),
            x: 10.0,
            y: -0.0,
        });
        emitter.line(&LineConnectivity {
            id: "C1".to_string(),
            kind: LineKind::Column,
            start: "1".to_string(),
            end: "1".to_string(),
            story_offset: 1,
        });
        assert_eq!(
            emitter.finish(),
            "  POINT  \"1\"  10.0000000000  0.0000000000\n  LINE  \"C1\"  COLUMN  \"1\"  \"1\"  1\n"
        );
    }

    #[test]
    fn test_panel_closure() {
        let options = EmitOptions::default();
        let mut emitter = RecordEmitter::new(&options);
        emitter.area(&AreaConnectivity {
            id: "W1".to_string(),
            kind: AreaKind::Panel,
            points: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            story_offsets: vec![1, 1, 1],
        });
        assert_eq!(
            emitter.finish(),
            "  AREA  \"W1\"  PANEL  4  \"1\"  \"2\"  \"3\"  \"1\"  1  1  1  1\n"
        );
    }

    #[test]
    fn test_closed_panel_unchanged() {
        let options = EmitOptions::default();
        let mut emitter = RecordEmitter::new(&options);
        emitter.area(&AreaConnectivity {
            id: "W1".to_string(),
            kind: AreaKind::Panel,
            points: vec!["1".to_string(), "2".to_string(), "1".to_string()],
            story_offsets: vec![0, 0, 0],
        });
        assert!(emitter.finish().contains("PANEL  3  "));
    }

    #[test]
    fn test_floor_not_closed() {
        let options = EmitOptions::default();
        let mut emitter = RecordEmitter::new(&options);
        emitter.area(&AreaConnectivity {
            id: "F1".to_string(),
            kind: AreaKind::Floor,
            points: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            story_offsets: vec![0, 0, 0],
        });
        assert!(emitter.finish().contains("FLOOR  3  "));
    }

    #[test]
    fn test_assign_layouts() {
        let options = EmitOptions::default();
        let mut emitter = RecordEmitter::new(&options);

        let mut beam = LineAssignment::new("B1", "Story1", "W12X26");
        beam.mesh = Some(MeshSpec::MaxStationSpacing(24.0));
        beam.auto_mesh = Some(true);
        beam.mesh_at_intersections = Some(true);
        emitter.line_assign(&beam);

        emitter.area_assign(&AreaAssignment {
            id: "F1".to_string(),
            story: "Story1".to_string(),
            body: AreaAssignmentBody::Section(AreaSectionAssignment {
                section: "SLAB1".to_string(),
                cardinal_point: Some("Top".to_string()),
                add_restraint: Some(false),
                ..Default::default()
            }),
        });

        let text = emitter.finish();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "  LINEASSIGN  \"B1\"  \"Story1\"  SECTION  \"W12X26\"  MAXSTASPC  24  AUTOMESH  \"YES\"  MESHATINTERSECTIONS  \"YES\""
        );
        assert_eq!(
            lines[1],
            "  AREAASSIGN  \"F1\"  \"Story1\"  SECTION  \"SLAB1\"  ADDRESTRAINT  \"No\"  CARDINALPOINT  \"Top\""
        );
    }

    #[test]
    fn test_section_header_spacing() {
        let options = EmitOptions::default();
        let mut emitter = RecordEmitter::new(&options);
        emitter.section(&SectionKind::Points);
        emitter.section(&SectionKind::End);
        assert_eq!(emitter.finish(), "$ POINT COORDINATES\n\n$ END OF MODEL FILE\n");
    }
}
