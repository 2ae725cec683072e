//! Chapter demuxing and payload decryption for `.aa` audio
//!
//! The audio region is a run of chapters, each an 8-byte header followed by
//! the chapter payload:
//!
//! ```text
//! u32 BE declared_size          payload bytes, header excluded
//! u32 BE data_start_offset      informational
//! declared_size bytes           codec blocks
//! ```
//!
//! The payload is cut into codec blocks of one second each
//! (`seconds_block_size` bytes), the last one possibly shorter. Within a
//! codec block every full 8-byte cipher block is TEA-decrypted on its own;
//! the `len % 8` trailing bytes are stored in the clear.
//!
//! There is no end marker: chapters are read until the source position
//! reaches the end of the audio region.

use crate::audio::codec::CodecParams;
use crate::container::header::TocEntry;
use crate::crypto::tea::{Tea, BLOCK_SIZE, KEY_SIZE};
use crate::error::{AaError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Length of the per-chapter header
pub const CHAPTER_HEADER_LEN: u64 = 8;

/// Header preceding each chapter payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterHeader {
    pub declared_size: u32,
    pub declared_data_start_offset: u32,
}

/// Chapter about to be decrypted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chapter {
    /// 0-based chapter number
    pub index: u32,
    pub header: ChapterHeader,
    /// Whole seconds of audio, truncated
    pub seconds: u32,
}

/// Running demux state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemuxCursor {
    /// Absolute source position
    pub position: u64,
    /// Bytes consumed since the start of the audio region, headers included
    pub bytes_consumed: u64,
    /// Bytes written for the current chapter
    pub chapter_bytes_written: u64,
    /// Bytes written over the whole run
    pub total_bytes_written: u64,
    /// Chapters started so far
    pub chapters: u32,
    pub cumulative_seconds: u64,
}

/// Destination for decrypted payload bytes
pub trait PayloadSink {
    fn write_payload(&mut self, bytes: &[u8]) -> Result<()>;
}

impl PayloadSink for Vec<u8> {
    fn write_payload(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Lengths of the codec blocks making up a chapter payload
///
/// Every block is `block_size` long except the last, which carries the
/// remainder when `declared_size` is not a multiple of `block_size`.
pub fn codec_block_lengths(declared_size: u32, block_size: u32) -> impl Iterator<Item = u32> {
    debug_assert!(block_size > 0);
    let mut remaining = declared_size;
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        let len = remaining.min(block_size);
        remaining -= len;
        Some(len)
    })
}

/// Decrypt one codec block in place; trailing partial cipher block is left as is
pub fn decrypt_codec_block(tea: &Tea, block: &mut [u8]) {
    let mut cipher_block = [0u8; BLOCK_SIZE];
    for chunk in block.chunks_exact_mut(BLOCK_SIZE) {
        cipher_block.copy_from_slice(chunk);
        tea.decrypt_block(&mut cipher_block);
        chunk.copy_from_slice(&cipher_block);
    }
}

/// Sequential chapter reader over the audio region of a source
///
/// The source must already be positioned at `region.start`.
pub struct ChapterDemuxer<R> {
    source: R,
    source_path: PathBuf,
    tea: Tea,
    params: CodecParams,
    region: TocEntry,
    cursor: DemuxCursor,
    buf: Vec<u8>,
}

impl<R: Read> ChapterDemuxer<R> {
    pub fn new(
        source: R,
        source_path: impl AsRef<Path>,
        key: &[u8; KEY_SIZE],
        params: CodecParams,
        region: TocEntry,
    ) -> Self {
        Self {
            source,
            source_path: source_path.as_ref().to_path_buf(),
            tea: Tea::new(key),
            params,
            region,
            cursor: DemuxCursor {
                position: u64::from(region.start),
                ..DemuxCursor::default()
            },
            buf: Vec::with_capacity(params.seconds_block_size as usize),
        }
    }

    pub fn cursor(&self) -> DemuxCursor {
        self.cursor
    }

    pub fn region(&self) -> TocEntry {
        self.region
    }

    /// Whether the audio region has been fully consumed
    pub fn is_done(&self) -> bool {
        self.cursor.position >= u64::from(self.region.end)
    }

    /// Read the next chapter header, or `None` once the region is consumed
    pub fn next_chapter(&mut self) -> Result<Option<Chapter>> {
        if self.is_done() {
            return Ok(None);
        }

        let declared_size = self.read_u32()?;
        let declared_data_start_offset = self.read_u32()?;
        let header = ChapterHeader {
            declared_size,
            declared_data_start_offset,
        };

        let seconds = self.params.whole_seconds(declared_size);
        let chapter = Chapter {
            index: self.cursor.chapters,
            header,
            seconds,
        };

        self.cursor.chapters += 1;
        self.cursor.cumulative_seconds += u64::from(seconds);
        self.cursor.chapter_bytes_written = 0;

        debug!(
            chapter = chapter.index,
            declared_size,
            declared_data_start_offset,
            seconds,
            total_seconds = self.cursor.cumulative_seconds,
            position = self.cursor.position,
            "Chapter header"
        );

        Ok(Some(chapter))
    }

    /// Decrypt the payload of `chapter` into `sink`, returning bytes written
    pub fn decrypt_chapter<S: PayloadSink + ?Sized>(
        &mut self,
        chapter: &Chapter,
        sink: &mut S,
    ) -> Result<u64> {
        let block_size = self.params.seconds_block_size;
        let mut written = 0u64;

        for len in codec_block_lengths(chapter.header.declared_size, block_size) {
            self.fill_buf(len as usize)?;
            decrypt_codec_block(&self.tea, &mut self.buf);
            sink.write_payload(&self.buf)?;
            written += u64::from(len);
        }

        self.cursor.chapter_bytes_written += written;
        self.cursor.total_bytes_written += written;
        Ok(written)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let value = self
            .source
            .read_u32::<BigEndian>()
            .map_err(|e| self.read_error(e))?;
        self.advance(4);
        Ok(value)
    }

    fn fill_buf(&mut self, len: usize) -> Result<()> {
        self.buf.resize(len, 0);
        if let Err(e) = self.source.read_exact(&mut self.buf) {
            return Err(self.read_error(e));
        }
        self.advance(len as u64);
        Ok(())
    }

    fn advance(&mut self, len: u64) {
        self.cursor.position += len;
        self.cursor.bytes_consumed += len;
    }

    fn read_error(&self, e: std::io::Error) -> AaError {
        if e.kind() == ErrorKind::UnexpectedEof {
            AaError::TruncatedSource {
                offset: self.cursor.position,
                expected_end: u64::from(self.region.end),
            }
        } else {
            AaError::io_at(&self.source_path, self.cursor.position, e)
        }
    }
}
