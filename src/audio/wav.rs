//! WAVE output container with deferred size fields
//!
//! # Header layout (56 bytes)
//! ```text
//!  0  "RIFF"
//!  4  u32 RIFF size              deferred
//!  8  "WAVE"
//! 12  "fmt "
//! 16  u32 16                     fmt chunk length
//! 20  u16 format tag
//! 22  u16 channels
//! 24  u32 sample rate
//! 28  u32 bytes per second       codec second size
//! 32  u16 block align
//! 34  u16 bits per sample        0
//! 36  "fact"
//! 40  u32 4
//! 44  u32 0
//! 48  "data"
//! 52  u32 data size              deferred
//! ```
//!
//! The deferred fields are written as big-endian zero placeholders when the
//! writer is created. [`WavWriter::finish`] is the only place they are
//! patched, little-endian, once the payload length is known. A writer that
//! is dropped without `finish` keeps the zero placeholders, so an aborted
//! file can be told apart from a complete one.

use crate::audio::codec::CodecParams;
use crate::crypto::aa::PayloadSink;
use crate::error::{AaError, Result};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Length of the header written by [`header_bytes`]
pub const WAV_HEADER_LEN: usize = 56;

const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 52;

/// Header bytes counted by the RIFF size besides the payload
const RIFF_OVERHEAD: u32 = WAV_HEADER_LEN as u32 - 8;

const FMT_CHUNK_LEN: u32 = 16;
const FACT_VALUE: u32 = 4;

/// Offsets of the size fields still to be patched
///
/// Created with the header and consumed by [`WavWriter::finish`].
#[derive(Debug)]
struct DeferredSizes {
    riff_size_offset: u64,
    data_size_offset: u64,
}

/// Header with zero placeholders in both size fields
pub fn header_bytes(params: &CodecParams) -> Vec<u8> {
    let mut header = Vec::with_capacity(WAV_HEADER_LEN);
    // writes into a Vec cannot fail
    write_header(&mut header, params).unwrap_or_default();
    header
}

fn write_header<W: Write>(out: &mut W, params: &CodecParams) -> std::io::Result<()> {
    out.write_all(b"RIFF")?;
    out.write_u32::<BigEndian>(0)?;
    out.write_all(b"WAVE")?;

    out.write_all(b"fmt ")?;
    out.write_u32::<LittleEndian>(FMT_CHUNK_LEN)?;
    out.write_u16::<LittleEndian>(params.format_tag)?;
    out.write_u16::<LittleEndian>(params.channel_count)?;
    out.write_u32::<LittleEndian>(params.sample_rate)?;
    out.write_u32::<LittleEndian>(params.seconds_block_size)?;
    out.write_u16::<LittleEndian>(params.block_align)?;
    out.write_u16::<LittleEndian>(0)?;

    out.write_all(b"fact")?;
    out.write_u32::<LittleEndian>(FACT_VALUE)?;
    out.write_u32::<LittleEndian>(0)?;

    out.write_all(b"data")?;
    out.write_u32::<BigEndian>(0)?;
    Ok(())
}

/// Streaming writer for one output container
pub struct WavWriter<W: Write + Seek = File> {
    path: PathBuf,
    open: Option<OpenContainer<W>>,
    payload_bytes: u64,
}

struct OpenContainer<W: Write> {
    out: BufWriter<W>,
    sizes: DeferredSizes,
}

impl WavWriter<File> {
    /// Create (or truncate) `path` and write the header
    pub fn create(path: impl AsRef<Path>, params: &CodecParams) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| AaError::io(path, e))?;
        Self::new(file, path, params)
    }
}

impl<W: Write + Seek> WavWriter<W> {
    /// Write the header to `inner`, which must be positioned at offset 0
    ///
    /// `path` is only used to label errors.
    pub fn new(inner: W, path: impl AsRef<Path>, params: &CodecParams) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut out = BufWriter::new(inner);
        write_header(&mut out, params).map_err(|e| AaError::io_at(&path, 0, e))?;

        debug!(path = %path.display(), codec = params.codec_id.as_str(), "Opened output container");

        Ok(Self {
            path,
            open: Some(OpenContainer {
                out,
                sizes: DeferredSizes {
                    riff_size_offset: RIFF_SIZE_OFFSET,
                    data_size_offset: DATA_SIZE_OFFSET,
                },
            }),
            payload_bytes: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Payload bytes written so far
    pub fn payload_bytes(&self) -> u64 {
        self.payload_bytes
    }

    /// Flush the payload, patch both size fields and return the inner stream
    ///
    /// # Errors
    /// `AaError::PayloadTooLarge` if the payload does not fit the header; the
    /// size fields are then left at their placeholders.
    pub fn finish(mut self) -> Result<W> {
        let payload = u32::try_from(self.payload_bytes)
            .ok()
            .filter(|&len| len <= u32::MAX - RIFF_OVERHEAD)
            .ok_or(AaError::PayloadTooLarge {
                bytes: self.payload_bytes,
            })?;

        let OpenContainer { mut out, sizes } = self.open.take().ok_or_else(|| self.closed())?;

        out.flush().map_err(|e| AaError::io(&self.path, e))?;
        let mut inner = out
            .into_inner()
            .map_err(|e| AaError::io(&self.path, e.into_error()))?;

        patch_u32(&mut inner, &self.path, sizes.riff_size_offset, payload + RIFF_OVERHEAD)?;
        patch_u32(&mut inner, &self.path, sizes.data_size_offset, payload)?;
        inner
            .seek(SeekFrom::End(0))
            .map_err(|e| AaError::io(&self.path, e))?;

        debug!(path = %self.path.display(), payload_bytes = payload, "Finished output container");
        Ok(inner)
    }

    /// Close without patching; the size fields stay zero
    pub fn abandon(mut self) {
        self.close_unfinished();
    }

    fn closed(&self) -> AaError {
        AaError::io(
            &self.path,
            std::io::Error::new(std::io::ErrorKind::Other, "output container already closed"),
        )
    }

    fn close_unfinished(&mut self) {
        if let Some(mut open) = self.open.take() {
            let _ = open.out.flush();
            warn!(
                path = %self.path.display(),
                payload_bytes = self.payload_bytes,
                "Output container left incomplete"
            );
        }
    }
}

fn patch_u32<W: Write + Seek>(inner: &mut W, path: &Path, offset: u64, value: u32) -> Result<()> {
    inner
        .seek(SeekFrom::Start(offset))
        .and_then(|_| inner.write_u32::<LittleEndian>(value))
        .map_err(|e| AaError::io_at(path, offset, e))
}

impl<W: Write + Seek> PayloadSink for WavWriter<W> {
    fn write_payload(&mut self, bytes: &[u8]) -> Result<()> {
        let offset = WAV_HEADER_LEN as u64 + self.payload_bytes;
        let Some(open) = self.open.as_mut() else {
            return Err(self.closed());
        };
        open.out
            .write_all(bytes)
            .map_err(|e| AaError::io_at(&self.path, offset, e))?;
        self.payload_bytes += bytes.len() as u64;
        Ok(())
    }
}

impl<W: Write + Seek> Drop for WavWriter<W> {
    fn drop(&mut self) {
        self.close_unfinished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::codec::CodecId;
    use std::io::Cursor;

    fn le_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_layout() {
        let params = CodecParams::for_codec(CodecId::Mp332);
        let header = header_bytes(&params);

        assert_eq!(header.len(), WAV_HEADER_LEN);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[4..8], &[0, 0, 0, 0]);
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(le_u32(&header, 16), 16);
        assert_eq!(&header[20..22], &0x55u16.to_le_bytes());
        assert_eq!(&header[22..24], &1u16.to_le_bytes());
        assert_eq!(le_u32(&header, 24), 22050);
        assert_eq!(le_u32(&header, 28), 3982);
        assert_eq!(&header[32..34], &1u16.to_le_bytes());
        assert_eq!(&header[34..36], &[0, 0]);
        assert_eq!(&header[36..40], b"fact");
        assert_eq!(le_u32(&header, 40), 4);
        assert_eq!(le_u32(&header, 44), 0);
        assert_eq!(&header[48..52], b"data");
        assert_eq!(&header[52..56], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_finish_patches_only_size_fields() {
        let params = CodecParams::for_codec(CodecId::Acelp16);
        let mut writer = WavWriter::new(Cursor::new(Vec::new()), "mem.wav", &params).unwrap();
        writer.write_payload(&[1, 2, 3]).unwrap();
        writer.write_payload(&[4; 997]).unwrap();
        assert_eq!(writer.payload_bytes(), 1000);

        let bytes = writer.finish().unwrap().into_inner();
        let expected = header_bytes(&params);

        assert_eq!(bytes.len(), WAV_HEADER_LEN + 1000);
        assert_eq!(le_u32(&bytes, 4), 1000 + 48);
        assert_eq!(le_u32(&bytes, 52), 1000);
        assert_eq!(&bytes[..4], &expected[..4]);
        assert_eq!(&bytes[8..52], &expected[8..52]);
        assert_eq!(&bytes[56..59], &[1, 2, 3]);
    }

    #[test]
    fn test_empty_payload() {
        let params = CodecParams::for_codec(CodecId::Acelp85);
        let writer = WavWriter::new(Cursor::new(Vec::new()), "mem.wav", &params).unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert_eq!(bytes.len(), WAV_HEADER_LEN);
        assert_eq!(le_u32(&bytes, 4), 48);
        assert_eq!(le_u32(&bytes, 52), 0);
    }

    #[test]
    fn test_abandoned_file_keeps_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.wav");
        let params = CodecParams::for_codec(CodecId::Mp332);

        let mut writer = WavWriter::create(&path, &params).unwrap();
        writer.write_payload(&[9; 64]).unwrap();
        writer.abandon();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_LEN + 64);
        assert_eq!(&bytes[..WAV_HEADER_LEN], header_bytes(&params).as_slice());
    }

    #[test]
    fn test_dropped_writer_keeps_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.wav");
        let params = CodecParams::for_codec(CodecId::Mp332);

        {
            let mut writer = WavWriter::create(&path, &params).unwrap();
            writer.write_payload(&[1; 10]).unwrap();
        }

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(le_u32(&bytes, 52), 0);
        assert_eq!(le_u32(&bytes, 4), 0);
    }
}
