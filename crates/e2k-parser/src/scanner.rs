// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast section scanner using SIMD-accelerated byte searching
//!
//! Splits E2K text into `$ SECTION` headers and data lines without
//! tokenizing anything.

use memchr::memchr;
use rustc_hash::FxHashMap;

/// E2K section, identified by its `$` header
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Lines before the first header
    Preamble,
    /// `$ PROGRAM INFORMATION`
    ProgramInfo,
    /// `$ STORIES - IN SEQUENCE FROM TOP`
    Stories,
    /// `$ DIAPHRAGM NAMES`
    Diaphragms,
    /// `$ GRIDS`
    Grids,
    /// `$ POINT COORDINATES`
    Points,
    /// `$ LINE CONNECTIVITIES`
    LineConnectivities,
    /// `$ AREA CONNECTIVITIES`
    AreaConnectivities,
    /// `$ LINE ASSIGNS`
    LineAssigns,
    /// `$ AREA ASSIGNS`
    AreaAssigns,
    /// `$ END OF MODEL FILE`
    End,
    /// Any other header, kept verbatim
    Other(String),
}

impl SectionKind {
    /// Classify a header (text after `$`)
    pub fn from_header(header: &str) -> Self {
        let upper = header.trim().to_ascii_uppercase();
        let h = upper.as_str();
        if h.starts_with("STORIES") {
            SectionKind::Stories
        } else if h.starts_with("DIAPHRAGM NAMES") {
            SectionKind::Diaphragms
        } else if h == "GRIDS" {
            SectionKind::Grids
        } else if h.starts_with("POINT COORDINATES") {
            SectionKind::Points
        } else if h.starts_with("LINE CONNECTIVITIES") {
            SectionKind::LineConnectivities
        } else if h.starts_with("AREA CONNECTIVITIES") {
            SectionKind::AreaConnectivities
        } else if h.starts_with("LINE ASSIGNS") {
            SectionKind::LineAssigns
        } else if h.starts_with("AREA ASSIGNS") {
            SectionKind::AreaAssigns
        } else if h.starts_with("PROGRAM INFORMATION") {
            SectionKind::ProgramInfo
        } else if h.starts_with("END OF MODEL FILE") {
            SectionKind::End
        } else {
            SectionKind::Other(header.trim().to_string())
        }
    }

    /// Header text written on emit
    pub fn header(&self) -> &str {
        match self {
            SectionKind::Preamble => "",
            SectionKind::ProgramInfo => "PROGRAM INFORMATION",
            SectionKind::Stories => "STORIES - IN SEQUENCE FROM TOP",
            SectionKind::Diaphragms => "DIAPHRAGM NAMES",
            SectionKind::Grids => "GRIDS",
            SectionKind::Points => "POINT COORDINATES",
            SectionKind::LineConnectivities => "LINE CONNECTIVITIES",
            SectionKind::AreaConnectivities => "AREA CONNECTIVITIES",
            SectionKind::LineAssigns => "LINE ASSIGNS",
            SectionKind::AreaAssigns => "AREA ASSIGNS",
            SectionKind::End => "END OF MODEL FILE",
            SectionKind::Other(name) => name,
        }
    }

    /// Leading keyword of the records this section holds
    pub fn record_keyword(&self) -> Option<&'static str> {
        match self {
            SectionKind::Stories => Some("STORY"),
            SectionKind::Diaphragms => Some("DIAPHRAGM"),
            SectionKind::Grids => Some("GRID"),
            SectionKind::Points => Some("POINT"),
            SectionKind::LineConnectivities => Some("LINE"),
            SectionKind::AreaConnectivities => Some("AREA"),
            SectionKind::LineAssigns => Some("LINEASSIGN"),
            SectionKind::AreaAssigns => Some("AREAASSIGN"),
            _ => None,
        }
    }

    /// Sections whose records the codec decodes
    pub fn is_model_section(&self) -> bool {
        self.record_keyword().is_some()
    }
}

/// One non-blank line of E2K text
#[derive(Clone, Debug, PartialEq)]
pub enum ScanItem<'a> {
    /// `$ NAME` header line
    Header {
        number: usize,
        kind: SectionKind,
    },
    /// Any other line, trimmed
    Data { number: usize, text: &'a str },
}

/// Line scanner for E2K files
///
/// Uses memchr to find line ends; line numbers are 1-based.
pub struct SectionScanner<'a> {
    content: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> SectionScanner<'a> {
    /// Create a new scanner for the given content
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            line: 0,
        }
    }

    /// Scan to the next non-blank line
    pub fn next_item(&mut self) -> Option<ScanItem<'a>> {
        let bytes = self.content.as_bytes();

        while self.pos < bytes.len() {
            let start = self.pos;
            let end = match memchr(b'\n', &bytes[start..]) {
                Some(offset) => start + offset,
                None => bytes.len(),
            };
            self.pos = end + 1;
            self.line += 1;

            let text = self.content[start..end].trim();
            if text.is_empty() {
                continue;
            }

            if let Some(header) = text.strip_prefix('$') {
                return Some(ScanItem::Header {
                    number: self.line,
                    kind: SectionKind::from_header(header),
                });
            }

            return Some(ScanItem::Data {
                number: self.line,
                text,
            });
        }

        None
    }

    /// Count data lines per section
    pub fn count_by_section(content: &'a str) -> FxHashMap<SectionKind, usize> {
        let mut scanner = Self::new(content);
        let mut counts: FxHashMap<SectionKind, usize> = FxHashMap::default();
        let mut section = SectionKind::Preamble;

        while let Some(item) = scanner.next_item() {
            match item {
                ScanItem::Header { kind, .. } => section = kind,
                ScanItem::Data { .. } => *counts.entry(section.clone()).or_insert(0) += 1,
            }
        }

        counts
    }

    /// All section headers in file order
    pub fn sections(content: &'a str) -> Vec<SectionKind> {
        let mut scanner = Self::new(content);
        let mut sections = Vec::new();

        while let Some(item) = scanner.next_item() {
            if let ScanItem::Header { kind, .. } = item {
                sections.push(kind);
            }
        }

        sections
    }
}

impl<'a> Iterator for SectionScanner<'a> {
    type Item = ScanItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_item()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_E2K: &str = "$ PROGRAM INFORMATION\r\n  PROGRAM  \"ETABS\"  VERSION \"9.7.4\"\r\n\r\n$ POINT COORDINATES\n  POINT \"1\"  0  0\n  POINT \"2\"  120  0\n\n$ LINE CONNECTIVITIES\n  LINE  \"B1\"  BEAM  \"1\"  \"2\"  0\n$ LOAD PATTERNS\n  LOADPATTERN \"DEAD\"  TYPE  \"Dead\"\n";

    #[test]
    fn test_scanner_finds_headers_and_lines() {
        let items: Vec<_> = SectionScanner::new(TEST_E2K).collect();
        assert_eq!(items.len(), 9);
        assert_eq!(
            items[0],
            ScanItem::Header {
                number: 1,
                kind: SectionKind::ProgramInfo
            }
        );
        assert_eq!(
            items[3],
            ScanItem::Data {
                number: 5,
                text: "POINT \"1\"  0  0"
            }
        );
    }

    #[test]
    fn test_count_by_section() {
        let counts = SectionScanner::count_by_section(TEST_E2K);
        assert_eq!(counts.get(&SectionKind::Points), Some(&2));
        assert_eq!(counts.get(&SectionKind::LineConnectivities), Some(&1));
        assert_eq!(
            counts.get(&SectionKind::Other("LOAD PATTERNS".to_string())),
            Some(&1)
        );
    }

    #[test]
    fn test_header_classification() {
        assert_eq!(
            SectionKind::from_header(" STORIES - IN SEQUENCE FROM TOP"),
            SectionKind::Stories
        );
        assert_eq!(SectionKind::from_header("area assigns"), SectionKind::AreaAssigns);
        assert_eq!(
            SectionKind::from_header("GRIDSYSTEMS"),
            SectionKind::Other("GRIDSYSTEMS".to_string())
        );
        assert!(SectionKind::Points.is_model_section());
        assert!(!SectionKind::End.is_model_section());
    }

    #[test]
    fn test_sections_in_order() {
        let sections = SectionScanner::sections(TEST_E2K);
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[1], SectionKind::Points);
    }
}
