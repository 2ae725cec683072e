//! Audio region lookup in the table of contents
//!
//! The first TOC entry is reserved for metadata and never selected. Of the
//! rest, the widest range holds the chapter-segmented audio; ties go to the
//! earliest entry.

use crate::container::header::TocEntry;
use crate::error::{AaError, Result};

/// Locate the audio region, returning its TOC index and range
///
/// # Errors
/// `AaError::EmptyToc` if the TOC has fewer than two entries.
pub fn locate_audio_region(toc: &[TocEntry]) -> Result<(usize, TocEntry)> {
    let first = toc.get(1).ok_or(AaError::EmptyToc { entries: toc.len() })?;

    let selected = toc
        .iter()
        .enumerate()
        .skip(2)
        .fold((1, *first), |best, (index, entry)| {
            if entry.len() > best.1.len() {
                (index, *entry)
            } else {
                best
            }
        });

    Ok(selected)
}
