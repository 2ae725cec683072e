//! Decryption options

use crate::error::Result;
use crate::file::paths::DEFAULT_PART_EXTENSION;
use serde::{Deserialize, Serialize};

/// Options for a decryption run
///
/// Missing fields in a JSON document fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecryptOptions {
    /// Write one output container per chapter plus a playlist
    pub split: bool,

    /// Word used in playlist titles, as in "<title> - Chapter 3"
    pub chapter_label: String,

    /// Extension of per-chapter output files
    pub part_extension: String,
}

impl Default for DecryptOptions {
    fn default() -> Self {
        Self {
            split: false,
            chapter_label: "Chapter".to_string(),
            part_extension: DEFAULT_PART_EXTENSION.to_string(),
        }
    }
}

impl DecryptOptions {
    pub fn split() -> Self {
        Self {
            split: true,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Playlist title of chapter `index`
    pub fn chapter_title(&self, title: &str, index: u32) -> String {
        format!("{} - {} {}", title, self.chapter_label, index)
    }
}
