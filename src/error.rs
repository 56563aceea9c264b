//! Error taxonomy for zone configuration, detection polling and storage.
//!
//! Startup problems (`GeometryConfigError`) are fatal. Everything else is
//! recovered by the sampling loop for the tick it happened in.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryConfigError {
    #[error("zone '{zone}' polygon has {count} vertices, at least 3 are required")]
    TooFewVertices { zone: String, count: usize },

    #[error("zone '{zone}' flat coordinate list has odd length {len}")]
    OddCoordinateList { zone: String, len: usize },

    #[error("zone '{zone}' has a non-finite coordinate at vertex {index}")]
    NonFiniteVertex { zone: String, index: usize },

    #[error("zone priority references undefined zone '{0}'")]
    UnknownZone(String),

    #[error("zone '{0}' is listed more than once")]
    DuplicateZone(String),

    #[error("zone '{0}' is defined but missing from the priority order")]
    UnprioritizedZone(String),
}

/// The detection source could not produce a batch for this tick.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("detection request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("detection request timed out after {0}s")]
    Timeout(u64),

    #[error("detection source returned HTTP {0}")]
    Status(u16),

    #[error("detection payload could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write sample: {0}")]
    Write(String),

    #[error("row {id} is corrupt: {reason}")]
    CorruptRow { id: i64, reason: String },
}
