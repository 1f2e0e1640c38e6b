// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exchange options
//!
//! Every option struct deserializes with defaults for missing fields, so a
//! host can keep a partial JSON block in its own settings.

use crate::span::SpanRow;
use e2k_model::{ExchangeError, Result, EXACT_TOLERANCE, FALLBACK_TOLERANCE};
use e2k_parser::EmitOptions;
use serde::{Deserialize, Serialize};

/// What to emit when a span's top level lies below its base level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpanFallback {
    /// One base row at the base level
    #[default]
    BaseRowOnly,
    /// One row per known level, the lowest marked base
    AllLevels,
}

/// How beam and brace end points become point ids on export
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointMatching {
    /// Intern every end point, creating new ids as needed
    #[default]
    Intern,
    /// Match end points against points already interned by columns, walls,
    /// floors and grids; unmatched ends are written as `"0"`
    SnapToExisting,
}

/// End release codes written on line assignments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleasePolicy {
    /// Column row at the bottom of a span
    pub column_base: Option<String>,
    /// Column rows above the bottom of a span
    pub column_intermediate: Option<String>,
    pub brace: Option<String>,
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        Self {
            column_base: Some("M2I M3I".to_string()),
            column_intermediate: Some("PINNED".to_string()),
            brace: Some("PINNED".to_string()),
        }
    }
}

impl ReleasePolicy {
    /// No releases on any row
    pub fn none() -> Self {
        Self {
            column_base: None,
            column_intermediate: None,
            brace: None,
        }
    }

    pub fn for_column(&self, row: SpanRow) -> Option<&str> {
        match row {
            SpanRow::Base => self.column_base.as_deref(),
            SpanRow::Intermediate => self.column_intermediate.as_deref(),
        }
    }

    pub fn for_brace(&self) -> Option<&str> {
        self.brace.as_deref()
    }
}

/// Meshing and placement attributes written on assignment rows
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshDefaults {
    /// `MAXSTASPC` for beams
    pub beam_max_station_spacing: f64,
    /// `MINNUMSTA` for columns and braces
    pub min_stations: u32,
    pub auto_mesh: bool,
    pub mesh_at_intersections: bool,
    /// `OBJMESHTYPE` for walls and floors
    pub area_mesh_type: String,
    pub add_restraint: bool,
    pub wall_cardinal_point: String,
    pub floor_cardinal_point: String,
    pub transform_stiffness: bool,
}

impl Default for MeshDefaults {
    fn default() -> Self {
        Self {
            beam_max_station_spacing: 24.0,
            min_stations: 3,
            auto_mesh: true,
            mesh_at_intersections: true,
            area_mesh_type: "DEFAULT".to_string(),
            add_restraint: false,
            wall_cardinal_point: "Middle".to_string(),
            floor_cardinal_point: "Top".to_string(),
            transform_stiffness: false,
        }
    }
}

/// Options for one exchange engine
///
/// # Example
///
/// ```ignore
/// let options = ExchangeOptions::new()
///     .with_tolerances(1e-3, 0.5)
///     .with_point_matching(PointMatching::SnapToExisting);
/// options.validate()?;
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeOptions {
    /// Per-axis tolerance for interning
    pub exact_tolerance: f64,
    /// Distance tolerance for nearest-point resolution
    pub fallback_tolerance: f64,
    pub emit: EmitOptions,
    pub releases: ReleasePolicy,
    pub mesh: MeshDefaults,
    /// Diaphragm written for floors that carry none
    pub default_diaphragm: String,
    pub span_fallback: SpanFallback,
    pub point_matching: PointMatching,
    /// Merge consecutive one-story column rows into one column on import
    pub merge_column_stacks: bool,
    /// Reject text without model records in the file helpers
    pub strict_parsing: bool,
    pub write_stories: bool,
    pub write_grids: bool,
    pub write_diaphragms: bool,
}

impl Default for ExchangeOptions {
    fn default() -> Self {
        Self {
            exact_tolerance: EXACT_TOLERANCE,
            fallback_tolerance: FALLBACK_TOLERANCE,
            emit: EmitOptions::default(),
            releases: ReleasePolicy::default(),
            mesh: MeshDefaults::default(),
            default_diaphragm: "D1".to_string(),
            span_fallback: SpanFallback::default(),
            point_matching: PointMatching::default(),
            merge_column_stacks: false,
            strict_parsing: false,
            write_stories: true,
            write_grids: true,
            write_diaphragms: true,
        }
    }
}

impl ExchangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_tolerances(mut self, exact: f64, fallback: f64) -> Self {
        self.exact_tolerance = exact;
        self.fallback_tolerance = fallback;
        self
    }

    pub fn with_emit_options(mut self, emit: EmitOptions) -> Self {
        self.emit = emit;
        self
    }

    pub fn with_releases(mut self, releases: ReleasePolicy) -> Self {
        self.releases = releases;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshDefaults) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn with_default_diaphragm(mut self, name: impl Into<String>) -> Self {
        self.default_diaphragm = name.into();
        self
    }

    pub fn with_span_fallback(mut self, fallback: SpanFallback) -> Self {
        self.span_fallback = fallback;
        self
    }

    pub fn with_point_matching(mut self, matching: PointMatching) -> Self {
        self.point_matching = matching;
        self
    }

    pub fn with_column_stack_merging(mut self, enabled: bool) -> Self {
        self.merge_column_stacks = enabled;
        self
    }

    pub fn with_strict_parsing(mut self, enabled: bool) -> Self {
        self.strict_parsing = enabled;
        self
    }

    /// Set which optional sections export writes
    pub fn with_sections(mut self, stories: bool, grids: bool, diaphragms: bool) -> Self {
        self.write_stories = stories;
        self.write_grids = grids;
        self.write_diaphragms = diaphragms;
        self
    }

    /// Check tolerances and names
    pub fn validate(&self) -> Result<()> {
        if !(self.exact_tolerance.is_finite() && self.exact_tolerance > 0.0) {
            return Err(ExchangeError::config(format!(
                "exact tolerance must be positive, got {}",
                self.exact_tolerance
            )));
        }
        if !(self.fallback_tolerance.is_finite() && self.fallback_tolerance >= self.exact_tolerance) {
            return Err(ExchangeError::config(format!(
                "fallback tolerance {} is below exact tolerance {}",
                self.fallback_tolerance, self.exact_tolerance
            )));
        }
        if self.default_diaphragm.trim().is_empty() {
            return Err(ExchangeError::config("default diaphragm name is empty"));
        }
        if self.emit.coordinate_precision > 17 {
            return Err(ExchangeError::config(format!(
                "coordinate precision {} exceeds 17 digits",
                self.emit.coordinate_precision
            )));
        }
        if !(self.mesh.beam_max_station_spacing > 0.0) {
            return Err(ExchangeError::config("beam station spacing must be positive"));
        }
        Ok(())
    }
}
