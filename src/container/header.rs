//! Header fields supplied by a container parser
//!
//! The decryption pipeline only needs four things from the source container:
//! the tag dictionary, the TOC, the header seed and the masked header key.
//! [`HeaderSource`] is the seam between the pipeline and whatever parsed the
//! container; [`HeaderFields`] is a plain owned implementation of it.

use crate::crypto::tea::KEY_SIZE;
use crate::error::{AaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Codec identifier tag, see [`crate::audio::codec`]
pub const TAG_CODEC: &str = "codec";

/// Human-readable title tag, required for split output
pub const TAG_TITLE: &str = "title";

/// Byte range `[start, end)` within the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub start: u32,
    pub end: u32,
}

impl TocEntry {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Length of the range; inverted ranges count as empty
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parsed header of an encrypted source container
pub trait HeaderSource {
    /// Tag dictionary (`codec`, `title`, ...)
    fn tags(&self) -> &BTreeMap<String, String>;

    /// Table of contents in file order
    fn toc(&self) -> &[TocEntry];

    /// Seed for the header keystream
    fn header_seed(&self) -> u32;

    /// Masked content key, big-endian word order
    fn header_key(&self) -> [u8; KEY_SIZE];

    fn tag(&self, name: &str) -> Option<&str> {
        self.tags().get(name).map(String::as_str)
    }

    /// Tag value, or `AaError::MissingTag`
    fn required_tag(&self, name: &str) -> Result<&str> {
        self.tag(name).ok_or_else(|| AaError::missing_tag(name))
    }
}

/// Owned header fields, e.g. from a parser living outside this crate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    pub tags: BTreeMap<String, String>,
    pub toc: Vec<TocEntry>,
    pub header_seed: u32,
    pub header_key: [u8; KEY_SIZE],
}

impl HeaderSource for HeaderFields {
    fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    fn header_seed(&self) -> u32 {
        self.header_seed
    }

    fn header_key(&self) -> [u8; KEY_SIZE] {
        self.header_key
    }
}
