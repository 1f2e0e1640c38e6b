// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! E2K Model - Shared types and traits for E2K structural model exchange
//!
//! This crate provides the vocabulary shared by the E2K text codec and the
//! exchange engine: identifiers, plan coordinates, levels, the element graph
//! handed to and received from host applications, and the format-near
//! connectivity/assignment records the codec reads and writes.
//!
//! # Architecture
//!
//! - [`types`] - Identifiers, [`Point2D`], [`LevelRef`], section and diaphragm references
//! - [`elements`] - Beam/Column/Brace/Wall/Floor/Opening/Grid values and [`ElementContainer`]
//! - [`records`] - Connectivity and assignment records plus their keyed tables
//! - [`catalog`] - Name/id tables supplied by the host ([`HostCatalog`])
//! - [`report`] - Per-pass reports listing skipped elements and why
//! - [`traits`] - [`ModelImporter`] / [`ModelExporter`] entry points
//!
//! # Example
//!
//! ```ignore
//! use e2k_model::{HostCatalog, LevelRef, LevelId, ModelImporter};
//!
//! let catalog = HostCatalog::new().with_level(LevelRef::new(LevelId(1), "Story1", 0.0));
//! let outcome = importer.import(e2k_text, &catalog);
//! println!("{} beams", outcome.elements.beams.len());
//! ```

pub mod catalog;
pub mod elements;
pub mod error;
pub mod records;
pub mod report;
pub mod traits;
pub mod types;

// Re-export all public types
pub use catalog::*;
pub use elements::*;
pub use error::*;
pub use records::*;
pub use report::*;
pub use traits::*;
pub use types::*;
