// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for E2K exchange
//!
//! Hosts call into the engine through these two traits with plain data and
//! receive plain data back.

use crate::{ElementContainer, ExportOutcome, HostCatalog, ImportOutcome};

/// E2K text → element graph
///
/// # Example
///
/// ```ignore
/// use e2k_model::{HostCatalog, ModelImporter};
///
/// let outcome = importer.import(&text, &catalog);
/// for skipped in &outcome.report.skipped {
///     eprintln!("skipped {}", skipped);
/// }
/// ```
pub trait ModelImporter {
    /// Import E2K content
    ///
    /// # Arguments
    /// * `content` - The E2K text
    /// * `catalog` - Host levels, properties and diaphragms; when it carries no
    ///   levels, the STORIES section of the text is used instead
    ///
    /// # Returns
    /// One element per resolved assignment row, plus a report of every
    /// element or row that was skipped
    fn import(&self, content: &str, catalog: &HostCatalog) -> ImportOutcome;
}

/// Element graph → E2K text
pub trait ModelExporter {
    /// Export elements
    ///
    /// # Arguments
    /// * `elements` - Elements to write
    /// * `catalog` - Host levels, properties and diaphragms the elements refer to
    ///
    /// # Returns
    /// The E2K text and a report with the emitted id of every element
    fn export(&self, elements: &ElementContainer, catalog: &HostCatalog) -> ExportOutcome;
}
