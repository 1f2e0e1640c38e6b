// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! E2K Parser - line-oriented codec for ETABS text models
//!
//! This crate reads and writes the sections of an E2K file that carry the
//! structural model: stories, diaphragms, grids, points, line and area
//! connectivities and their per-story assignments.
//!
//! # Features
//!
//! - **Section scanning** using `memchr`
//! - **Line tokenization** using `nom` combinators
//! - **Tolerant decoding** - malformed lines are skipped and counted
//! - **Stable emission** - fixed precision and a fixed section order
//!
//! # Example
//!
//! ```ignore
//! use e2k_parser::{E2kParser, EmitOptions};
//!
//! let document = E2kParser::new().parse(&content)?;
//! println!("{} points", document.points.len());
//!
//! let text = document.to_e2k(&EmitOptions::default());
//! ```

mod decoder;
mod document;
mod emitter;
mod scanner;
mod tokenizer;

pub use decoder::{decode_record, parse_flag, DecodedRecord};
pub use document::{E2kDocument, PROGRAM_NAME};
pub use emitter::{format_coordinate, format_number, EmitOptions, RecordEmitter};
pub use scanner::{ScanItem, SectionKind, SectionScanner};
pub use tokenizer::{tokenize, Token, TokenError, TokenLine};

use e2k_model::{ExchangeError, Result};
use std::path::Path;

/// Main E2K parser
#[derive(Clone, Debug, Default)]
pub struct E2kParser {
    /// Reject text without any decodable model record
    pub strict: bool,
}

impl E2kParser {
    /// Create a new tolerant parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that rejects text with no model records
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Set strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse E2K content
    pub fn parse(&self, content: &str) -> Result<E2kDocument> {
        let document = E2kDocument::parse(content);
        if self.strict && !document.has_model_content() {
            return Err(ExchangeError::format(format!(
                "no model records in {} lines",
                document.stats.lines
            )));
        }
        Ok(document)
    }

    /// Read and parse an E2K file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<E2kDocument> {
        let content = std::fs::read_to_string(path.as_ref())?;
        self.parse(&content)
    }
}

/// Quick parse function for simple use cases
pub fn parse(content: &str) -> E2kDocument {
    E2kDocument::parse(content)
}
