// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! E2K Exchange - structural model import and export over E2K text
//!
//! Sits between the E2K codec and a host's element graph. Import joins
//! connectivity and assignment records into beams, columns, braces, walls,
//! floors, openings and grids. Export does the reverse: it deduplicates
//! plan points, assigns positional ids and expands multi-story elements
//! into one assignment row per story.
//!
//! # Architecture
//!
//! - [`points`] - Tolerance-based point registry
//! - [`levels`] - Story name normalization and level lookup
//! - [`span`] - Base/top level → per-story rows
//! - [`import`] / [`export`] - The two passes
//! - [`options`] - Tolerances, release and mesh defaults, section toggles
//!
//! # Example
//!
//! ```ignore
//! use e2k_exchange::E2kExchange;
//! use e2k_model::{HostCatalog, ModelExporter, ModelImporter};
//!
//! let exchange = E2kExchange::new();
//! let outcome = exchange.import(&text, &HostCatalog::new());
//! let exported = exchange.export(&outcome.elements, &catalog);
//! ```

pub mod context;
pub mod export;
pub mod import;
pub mod levels;
pub mod options;
pub mod points;
pub mod span;

pub use context::{ExportContext, ImportContext};
pub use export::Exporter;
pub use import::Importer;
pub use levels::{levels_from_stories, normalize_story_name, LevelResolver};
pub use options::{ExchangeOptions, MeshDefaults, PointMatching, ReleasePolicy, SpanFallback};
pub use points::PointRegistry;
pub use span::{SpanExpander, SpanRow, SpanStep};

use e2k_model::{
    ElementContainer, ExportOutcome, ExportReport, HostCatalog, ImportOutcome, ModelExporter,
    ModelImporter, Result,
};
use e2k_parser::E2kParser;
use std::io::Write;
use std::path::Path;

/// Exchange engine
///
/// Holds only options; every call builds its own state, so one engine can
/// serve any number of imports and exports.
#[derive(Clone, Debug, Default)]
pub struct E2kExchange {
    options: ExchangeOptions,
}

impl E2kExchange {
    /// Engine with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with validated options
    pub fn with_options(options: ExchangeOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ExchangeOptions {
        &self.options
    }

    fn parser(&self) -> E2kParser {
        E2kParser::new().with_strict(self.options.strict_parsing)
    }

    /// Import that fails on text without model records in strict mode
    pub fn try_import(&self, content: &str, catalog: &HostCatalog) -> Result<ImportOutcome> {
        let document = self.parser().parse(content)?;
        Ok(Importer::new(&self.options).import_document(&document, catalog))
    }

    /// Read and import an E2K file
    pub fn import_file(&self, path: impl AsRef<Path>, catalog: &HostCatalog) -> Result<ImportOutcome> {
        let path = path.as_ref();
        log::info!("[E2K] Importing {}", path.display());
        let document = self.parser().parse_file(path)?;
        Ok(Importer::new(&self.options).import_document(&document, catalog))
    }

    /// Export into any writer
    pub fn export_to_writer(
        &self,
        elements: &ElementContainer,
        catalog: &HostCatalog,
        mut writer: impl Write,
    ) -> Result<ExportReport> {
        let outcome = self.export(elements, catalog);
        writer.write_all(outcome.text.as_bytes())?;
        writer.flush()?;
        Ok(outcome.report)
    }

    /// Export into a file, replacing it
    pub fn export_to_file(
        &self,
        elements: &ElementContainer,
        catalog: &HostCatalog,
        path: impl AsRef<Path>,
    ) -> Result<ExportReport> {
        let path = path.as_ref();
        log::info!("[E2K] Exporting {}", path.display());
        let file = std::fs::File::create(path)?;
        self.export_to_writer(elements, catalog, std::io::BufWriter::new(file))
    }
}

impl ModelImporter for E2kExchange {
    fn import(&self, content: &str, catalog: &HostCatalog) -> ImportOutcome {
        Importer::new(&self.options).import(content, catalog)
    }
}

impl ModelExporter for E2kExchange {
    fn export(&self, elements: &ElementContainer, catalog: &HostCatalog) -> ExportOutcome {
        Exporter::new(&self.options).export(elements, catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use e2k_model::{ExchangeError, ExchangeStage};

    #[test]
    fn test_invalid_options_rejected() {
        let options = ExchangeOptions::default().with_tolerances(-1.0, 0.1);
        assert!(matches!(
            E2kExchange::with_options(options),
            Err(ExchangeError::Config(_))
        ));
    }

    #[test]
    fn test_strict_import() {
        let strict = E2kExchange::with_options(ExchangeOptions::default().with_strict_parsing(true))
            .unwrap();
        assert!(strict.try_import("$ PROGRAM INFORMATION\n", &HostCatalog::new()).is_err());

        let tolerant = E2kExchange::new();
        let outcome = tolerant
            .try_import("$ PROGRAM INFORMATION\n", &HostCatalog::new())
            .unwrap();
        assert!(outcome.elements.is_empty());
        assert_eq!(outcome.report.stage, ExchangeStage::Done);
    }

    #[test]
    fn test_export_to_writer() {
        let exchange = E2kExchange::new();
        let mut buffer = Vec::new();
        let report = exchange
            .export_to_writer(&ElementContainer::new(), &HostCatalog::new(), &mut buffer)
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("$ PROGRAM INFORMATION"));
        assert!(text.trim_end().ends_with("$ END OF MODEL FILE"));
        assert_eq!(report.point_count, 0);
    }
}
