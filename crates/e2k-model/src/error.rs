// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for E2K exchange operations
//!
//! The exchange engine itself has no fatal conditions: a bad record is
//! skipped and described by a [`SkipReason`]. [`ExchangeError`] covers the
//! categories a host can hit around it (file I/O, strict parsing, options).

use crate::{LevelId, PropertyId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Errors that abort a whole exchange call
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Content is not recognisable as E2K
    #[error("Invalid E2K format: {0}")]
    InvalidFormat(String),

    /// Rejected exchange options
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Report or options could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ExchangeError {
    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        ExchangeError::InvalidFormat(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ExchangeError::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ExchangeError::Other(msg.into())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Serialization(err.to_string())
    }
}

/// Why a single element or assignment row was left out of a pass
///
/// Every variant is recoverable: the pass continues with the next record.
#[derive(Error, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Story name in an assignment row matches no registered level
    #[error("story \"{0}\" does not match any level")]
    UnknownStory(String),

    /// Element references a level id missing from the level list
    #[error("level {0} is not in the level list")]
    UnknownLevel(LevelId),

    /// Element references a property id missing from the property table
    #[error("property {0} is not in the property table")]
    MissingProperty(PropertyId),

    /// Element carries neither a property id nor a section name
    #[error("element has no section")]
    MissingSection,

    /// Connectivity references a point id with no POINT record
    #[error("point \"{0}\" is not defined")]
    MissingPoint(String),

    /// Assignment row references an element with no connectivity record
    #[error("no connectivity record for \"{0}\"")]
    OrphanedAssignment(String),

    /// Too few points, or coincident end points
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Assignment row kind does not apply to the element kind
    #[error("assignment does not apply: {0}")]
    Inapplicable(String),

    /// Element id already written earlier in the same export
    #[error("element already written as \"{0}\"")]
    DuplicateElement(String),
}

impl SkipReason {
    /// Create a degenerate geometry reason
    pub fn degenerate(msg: impl Into<String>) -> Self {
        SkipReason::DegenerateGeometry(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::UnknownStory("Story9".to_string());
        assert_eq!(reason.to_string(), "story \"Story9\" does not match any level");

        let reason = SkipReason::UnknownLevel(LevelId(4));
        assert_eq!(reason.to_string(), "level #4 is not in the level list");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.e2k");
        let err: ExchangeError = io.into();
        assert!(matches!(err, ExchangeError::Io(_)));
        assert!(err.to_string().contains("missing.e2k"));
    }
}
