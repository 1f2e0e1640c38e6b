// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record decoder
//!
//! Turns a tokenized data line into a typed record. Every decoder returns
//! `None` for a line that does not match its layout; the caller counts
//! those as skipped lines.

use crate::scanner::SectionKind;
use crate::tokenizer::{Token, TokenLine};
use e2k_model::{
    AreaAssignment, AreaAssignmentBody, AreaConnectivity, AreaKind, AreaSectionAssignment,
    DiaphragmRecord, GridPlacement, GridRecord, LineAssignment, LineConnectivity, LineKind,
    MeshSpec, PointRecord, StoryRecord,
};

/// A decoded data line
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedRecord {
    Point(PointRecord),
    Line(LineConnectivity),
    Area(AreaConnectivity),
    LineAssign(LineAssignment),
    AreaAssign(AreaAssignment),
    Story(StoryRecord),
    Grid(GridRecord),
    Diaphragm(DiaphragmRecord),
}

/// Decode a line of the given section
///
/// The caller has already checked the leading keyword.
pub fn decode_record(section: &SectionKind, line: &TokenLine) -> Option<DecodedRecord> {
    match section {
        SectionKind::Points => decode_point(line).map(DecodedRecord::Point),
        SectionKind::LineConnectivities => decode_line(line).map(DecodedRecord::Line),
        SectionKind::AreaConnectivities => decode_area(line).map(DecodedRecord::Area),
        SectionKind::LineAssigns => decode_line_assign(line).map(DecodedRecord::LineAssign),
        SectionKind::AreaAssigns => decode_area_assign(line).map(DecodedRecord::AreaAssign),
        SectionKind::Stories => decode_story(line).map(DecodedRecord::Story),
        SectionKind::Grids => decode_grid(line).map(DecodedRecord::Grid),
        SectionKind::Diaphragms => decode_diaphragm(line).map(DecodedRecord::Diaphragm),
        _ => None,
    }
}

/// `Yes`/`No` flag value
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_uppercase().as_str() {
        "YES" | "Y" | "TRUE" => Some(true),
        "NO" | "N" | "FALSE" => Some(false),
        _ => None,
    }
}

fn flag(token: &Token) -> Option<bool> {
    token.text().and_then(parse_flag)
}

fn text(token: &Token) -> Option<String> {
    token.text().map(str::to_string)
}

/// `POINT "id" x y [...]`
pub fn decode_point(line: &TokenLine) -> Option<PointRecord> {
    Some(PointRecord {
        id: line.text(1)?.to_string(),
        x: line.number(2)?,
        y: line.number(3)?,
    })
}

/// `LINE "id" KIND "p1" "p2" offset`
pub fn decode_line(line: &TokenLine) -> Option<LineConnectivity> {
    Some(LineConnectivity {
        id: line.quoted(1)?.to_string(),
        kind: LineKind::from_keyword(line.text(2)?)?,
        start: line.text(3)?.to_string(),
        end: line.text(4)?.to_string(),
        story_offset: line.integer(5)? as i32,
    })
}

/// `AREA "id" KIND n "p1" .. "pn" o1 .. on`
pub fn decode_area(line: &TokenLine) -> Option<AreaConnectivity> {
    let id = line.quoted(1)?.to_string();
    let kind = AreaKind::from_keyword(line.text(2)?)?;
    let count = usize::try_from(line.integer(3)?).ok()?;
    let needed = count.checked_mul(2).and_then(|n| n.checked_add(4))?;
    if count == 0 || line.len() < needed {
        return None;
    }

    let points = (0..count)
        .map(|i| line.text(4 + i).map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    let story_offsets = (0..count)
        .map(|i| line.integer(4 + count + i).map(|o| o as i32))
        .collect::<Option<Vec<_>>>()?;

    Some(AreaConnectivity {
        id,
        kind,
        points,
        story_offsets,
    })
}

/// `LINEASSIGN "id" "story" SECTION "name" [KEY value]...`
///
/// Keys are matched regardless of order; unknown keys are kept in `extra`.
pub fn decode_line_assign(line: &TokenLine) -> Option<LineAssignment> {
    let id = line.quoted(1)?;
    let story = line.quoted(2)?;

    let mut section = None;
    let mut row = LineAssignment::new(id, story, String::new());

    for (key, value) in line.pairs(3)? {
        match key.to_ascii_uppercase().as_str() {
            "SECTION" => section = text(value),
            "RELEASE" => row.release = text(value),
            "MAXSTASPC" => row.mesh = Some(MeshSpec::MaxStationSpacing(value.number()?)),
            "MINNUMSTA" => {
                let n = value.number()?;
                if n < 0.0 || n.fract() != 0.0 {
                    return None;
                }
                row.mesh = Some(MeshSpec::MinStations(n as u32));
            }
            "AUTOMESH" => row.auto_mesh = flag(value),
            "MESHATINTERSECTIONS" => row.mesh_at_intersections = flag(value),
            _ => row.extra.push((key.to_string(), value.to_field_value())),
        }
    }

    row.section = section?;
    Some(row)
}

/// `AREAASSIGN "id" "story" [KEY value]...`
///
/// A row carries one of `SECTION`, `DIAPH` or `OPENING "Yes"`.
pub fn decode_area_assign(line: &TokenLine) -> Option<AreaAssignment> {
    let id = line.quoted(1)?.to_string();
    let story = line.quoted(2)?.to_string();

    let mut section = None;
    let mut diaphragm = None;
    let mut opening = false;
    let mut attrs = AreaSectionAssignment::default();

    for (key, value) in line.pairs(3)? {
        match key.to_ascii_uppercase().as_str() {
            "SECTION" => section = text(value),
            "DIAPH" => diaphragm = text(value),
            "OPENING" => opening = flag(value).unwrap_or(false),
            "OBJMESHTYPE" => attrs.mesh_type = text(value),
            "ADDRESTRAINT" => attrs.add_restraint = flag(value),
            "CARDINALPOINT" => attrs.cardinal_point = text(value),
            "TRANSFORMSTIFFNESSFOROFFSETS" => attrs.transform_stiffness = flag(value),
            _ => attrs.extra.push((key.to_string(), value.to_field_value())),
        }
    }

    let body = if opening {
        AreaAssignmentBody::Opening
    } else if let Some(section) = section {
        attrs.section = section;
        AreaAssignmentBody::Section(attrs)
    } else {
        AreaAssignmentBody::Diaphragm(diaphragm?)
    };

    Some(AreaAssignment { id, story, body })
}

/// `STORY "name" HEIGHT h [ELEV e] [MASTERSTORY "Yes"] ...`
pub fn decode_story(line: &TokenLine) -> Option<StoryRecord> {
    let mut story = StoryRecord {
        name: line.quoted(1)?.to_string(),
        height: None,
        elevation: None,
        master: None,
    };

    for (key, value) in line.pairs(2)? {
        match key.to_ascii_uppercase().as_str() {
            "HEIGHT" => story.height = Some(value.number()?),
            "ELEV" => story.elevation = Some(value.number()?),
            "MASTERSTORY" => story.master = flag(value),
            _ => {}
        }
    }

    if story.height.is_none() && story.elevation.is_none() {
        return None;
    }
    Some(story)
}

/// `GRID "system" LABEL "l" DIR "X"|"Y" COORD c` or `DIR "GENERAL" X1 .. Y2 ..`
pub fn decode_grid(line: &TokenLine) -> Option<GridRecord> {
    let system = line.quoted(1)?.to_string();

    let mut label = None;
    let mut direction = None;
    let mut coord = None;
    let mut ends = [None; 4];

    for (key, value) in line.pairs(2)? {
        match key.to_ascii_uppercase().as_str() {
            "LABEL" => label = text(value).or_else(|| value.number().map(|n| n.to_string())),
            "DIR" => direction = value.text().map(str::to_ascii_uppercase),
            "COORD" => coord = value.number(),
            "X1" => ends[0] = value.number(),
            "Y1" => ends[1] = value.number(),
            "X2" => ends[2] = value.number(),
            "Y2" => ends[3] = value.number(),
            _ => {}
        }
    }

    let direction = direction?;
    let placement = if direction == "GENERAL" {
        GridPlacement::General {
            x1: ends[0]?,
            y1: ends[1]?,
            x2: ends[2]?,
            y2: ends[3]?,
        }
    } else if direction == "X" || direction == "Y" {
        GridPlacement::Axis {
            direction,
            coordinate: coord?,
        }
    } else {
        return None;
    };

    Some(GridRecord {
        system,
        label: label?,
        placement,
    })
}

/// `DIAPHRAGM "name" TYPE RIGID`
pub fn decode_diaphragm(line: &TokenLine) -> Option<DiaphragmRecord> {
    let name = line.quoted(1)?.to_string();
    let mut rigidity = "RIGID".to_string();

    for (key, value) in line.pairs(2)? {
        if key.eq_ignore_ascii_case("TYPE") {
            rigidity = value.text()?.to_ascii_uppercase();
        }
    }

    Some(DiaphragmRecord { name, rigidity })
}
