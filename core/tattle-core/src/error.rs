//! Error types for tattle-core operations.
//!
//! Transient external-query failures (a process vanished, an attribute
//! read was rejected) are absorbed at the point of failure as "no signal"
//! and never surface here. `TattleError` covers the genuine caller-facing
//! failures only.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TattleError {
    #[error("not a usable file path: {0:?}")]
    InvalidPath(String),

    #[error("state database unavailable: {path:?}: {source}")]
    StateDb {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reveal needs exactly one matching application, found {found}")]
    AmbiguousReveal { found: usize },

    #[error("reveal action failed for {bundle_id}")]
    RevealFailed { bundle_id: String },
}

/// Convenience alias for Results using [`TattleError`].
pub type Result<T> = std::result::Result<T, TattleError>;
