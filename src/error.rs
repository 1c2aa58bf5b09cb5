//! Error types for lineage resolution.
//!
//! Only metadata normalization and I/O can fail. Dead ends found while
//! walking upstream references (unknown ids, fields without upstream,
//! unrecognized kinds) are recorded as sentinel rows instead, see
//! [`Sentinel`].

use std::fmt;

use crate::config::SettingsError;

/// Result type for lineage operations.
pub type LineageResult<T> = Result<T, LineageError>;

/// Error type for the lineage crate.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    /// A metadata record lacks a key that normalization requires.
    ///
    /// Fatal for the record that carries it, never for the whole run.
    #[error("Malformed metadata: '{entity}' is missing required key '{key}'")]
    MalformedMetadata { entity: String, key: &'static str },

    #[error("No workbook named '{0}' in the supplied metadata")]
    WorkbookNotFound(String),

    #[error("Failed to parse metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl LineageError {
    pub fn malformed(entity: impl Into<String>, key: &'static str) -> Self {
        LineageError::MalformedMetadata {
            entity: entity.into(),
            key,
        }
    }
}

/// Where resolution could not continue.
///
/// A sentinel is never raised; it is read back off the row that recorded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// A referenced calculated-field id was missing from the batch lookup.
    UnknownUpstreamId,
    /// A calculated field with no upstream fields (e.g. a literal constant).
    EmptyUpstream,
    /// An upstream kind the engine does not special-case, kept verbatim.
    UnrecognizedKind,
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentinel::UnknownUpstreamId => write!(f, "unknown upstream id"),
            Sentinel::EmptyUpstream => write!(f, "empty upstream"),
            Sentinel::UnrecognizedKind => write!(f, "unrecognized kind"),
        }
    }
}
