//! Error types for the decryption pipeline
//!
//! Every stage returns [`Result`]; the orchestrator surfaces the first failure
//! unchanged. None of these conditions are transient, so there is no retry.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, AaError>;

#[derive(Debug, Error)]
pub enum AaError {
    /// Codec tag not present in the parameter table
    #[error("unknown codec: {codec:?}")]
    UnknownCodec { codec: String },

    /// A tag required by the requested operation is absent
    #[error("missing required tag: {tag}")]
    MissingTag { tag: String },

    /// A tag is present but its value cannot be interpreted
    #[error("invalid value for tag {tag}: {value:?}")]
    InvalidTag { tag: String, value: String },

    /// Fewer than two TOC entries, so no audio region can be selected
    #[error("table of contents has {entries} entries, need at least 2")]
    EmptyToc { entries: usize },

    /// Source ran out before the located end of the audio region
    #[error("source truncated at offset {offset} (audio region ends at {expected_end})")]
    TruncatedSource { offset: u64, expected_end: u64 },

    /// Source header is structurally invalid
    #[error("invalid container: {0}")]
    InvalidContainer(String),

    /// Payload does not fit the 32-bit size fields of the output header
    #[error("payload of {bytes} bytes exceeds the output container size limit")]
    PayloadTooLarge { bytes: u64 },

    /// Open/read/write/seek failure on a source or output file
    #[error("I/O error on {} at offset {}: {source}", path.display(), offset.map_or_else(|| "-".to_string(), |o| o.to_string()))]
    Io {
        path: PathBuf,
        offset: Option<u64>,
        #[source]
        source: std::io::Error,
    },

    /// Options document could not be parsed
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

impl AaError {
    /// I/O failure with the offending path and no meaningful offset
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            offset: None,
            source,
        }
    }

    /// I/O failure at a known byte offset
    pub fn io_at(path: impl AsRef<Path>, offset: u64, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            offset: Some(offset),
            source,
        }
    }

    pub fn missing_tag(tag: &str) -> Self {
        Self::MissingTag { tag: tag.to_string() }
    }

    pub fn invalid_tag(tag: &str, value: impl Into<String>) -> Self {
        Self::InvalidTag {
            tag: tag.to_string(),
            value: value.into(),
        }
    }
}
