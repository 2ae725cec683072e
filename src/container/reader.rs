//! `.aa` header reader
//!
//! # Layout (big-endian)
//! ```text
//! u32 file_size
//! u32 magic                     0x57907536
//! u32 toc_count
//! u32 (unidentified)
//! toc_count x { u32 index, u32 offset, u32 size }
//! 24 bytes header termination block
//! u32 tag_count
//! tag_count x { u8 (unidentified), u32 key_len, u32 value_len, key, value }
//! ```
//!
//! `HeaderSeed` and `HeaderKey` arrive as tags: the seed as a decimal
//! integer, the key as four whitespace-separated decimal words.

use crate::container::header::{HeaderSource, TocEntry};
use crate::crypto::tea::KEY_SIZE;
use crate::error::{AaError, Result};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Magic number at offset 4
pub const AA_MAGIC: u32 = 0x5790_7536;

const TERMINATOR_LEN: usize = 24;
const MAX_TOC_ENTRIES: u32 = 16;
const MAX_TAGS: u32 = 128;
const MAX_TAG_LEN: u32 = 1 << 20;

pub const TAG_HEADER_SEED: &str = "HeaderSeed";
pub const TAG_HEADER_KEY: &str = "HeaderKey";

/// Header of an `.aa` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AaHeader {
    pub file_size: u32,
    pub toc: Vec<TocEntry>,
    pub tags: BTreeMap<String, String>,
    pub header_seed: u32,
    pub header_key: [u8; KEY_SIZE],
}

impl AaHeader {
    /// Read the header of the file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| AaError::io(path, e))?;
        Self::read(&mut BufReader::new(file), path)
    }

    /// Read a header from the start of `reader`; `path` labels errors
    pub fn read<R: Read>(reader: &mut R, path: &Path) -> Result<Self> {
        let mut input = HeaderInput {
            reader,
            path: path.to_path_buf(),
            offset: 0,
        };

        let file_size = input.u32()?;
        let magic = input.u32()?;
        if magic != AA_MAGIC {
            return Err(AaError::InvalidContainer(format!(
                "bad magic 0x{:08x}, expected 0x{:08x}",
                magic, AA_MAGIC
            )));
        }

        let toc_count = input.u32()?;
        if toc_count > MAX_TOC_ENTRIES {
            return Err(AaError::InvalidContainer(format!(
                "{} TOC entries exceeds limit of {}",
                toc_count, MAX_TOC_ENTRIES
            )));
        }
        input.skip(4)?;

        let mut toc = Vec::with_capacity(toc_count as usize);
        for _ in 0..toc_count {
            let _index = input.u32()?;
            let offset = input.u32()?;
            let size = input.u32()?;
            let end = offset.checked_add(size).ok_or_else(|| {
                AaError::InvalidContainer(format!("TOC entry {}+{} overflows", offset, size))
            })?;
            toc.push(TocEntry::new(offset, end));
        }

        input.skip(TERMINATOR_LEN)?;

        let tag_count = input.u32()?;
        if tag_count > MAX_TAGS {
            return Err(AaError::InvalidContainer(format!(
                "{} tags exceeds limit of {}",
                tag_count, MAX_TAGS
            )));
        }

        let mut tags = BTreeMap::new();
        for _ in 0..tag_count {
            input.skip(1)?;
            let key_len = input.u32()?;
            let value_len = input.u32()?;
            let key = input.string(key_len)?;
            let value = input.string(value_len)?;
            tags.insert(key, value);
        }

        let header_seed = parse_seed(&tags)?;
        let header_key = parse_key(&tags)?;

        debug!(
            toc_entries = toc.len(),
            tags = tags.len(),
            "Read .aa header from {}",
            path.display()
        );

        Ok(Self {
            file_size,
            toc,
            tags,
            header_seed,
            header_key,
        })
    }
}

impl HeaderSource for AaHeader {
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

/// Seed tag; negative values wrap as two's complement
fn parse_seed(tags: &BTreeMap<String, String>) -> Result<u32> {
    let raw = tags
        .get(TAG_HEADER_SEED)
        .ok_or_else(|| AaError::missing_tag(TAG_HEADER_SEED))?;
    let trimmed = raw.trim();

    trimmed
        .parse::<u32>()
        .or_else(|_| trimmed.parse::<i32>().map(|v| v as u32))
        .map_err(|_| AaError::invalid_tag(TAG_HEADER_SEED, raw.as_str()))
}

fn parse_key(tags: &BTreeMap<String, String>) -> Result<[u8; KEY_SIZE]> {
    let raw = tags
        .get(TAG_HEADER_KEY)
        .ok_or_else(|| AaError::missing_tag(TAG_HEADER_KEY))?;

    let words = raw
        .split_whitespace()
        .map(str::parse::<u32>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| AaError::invalid_tag(TAG_HEADER_KEY, raw.as_str()))?;

    if words.len() != KEY_SIZE / 4 {
        return Err(AaError::invalid_tag(TAG_HEADER_KEY, raw.as_str()));
    }

    let mut key = [0u8; KEY_SIZE];
    BigEndian::write_u32_into(&words, &mut key);
    Ok(key)
}

/// Reader that tracks its offset for error reporting
struct HeaderInput<'a, R> {
    reader: &'a mut R,
    path: PathBuf,
    offset: u64,
}

impl<R: Read> HeaderInput<'_, R> {
    fn fail(&self, e: std::io::Error) -> AaError {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            AaError::InvalidContainer(format!("header truncated at offset {}", self.offset))
        } else {
            AaError::io_at(&self.path, self.offset, e)
        }
    }

    fn u32(&mut self) -> Result<u32> {
        let value = self
            .reader
            .read_u32::<BigEndian>()
            .map_err(|e| self.fail(e))?;
        self.offset += 4;
        Ok(value)
    }

    fn bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf).map_err(|e| self.fail(e))?;
        self.offset += len as u64;
        Ok(buf)
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(|_| ())
    }

    fn string(&mut self, len: u32) -> Result<String> {
        if len > MAX_TAG_LEN {
            return Err(AaError::InvalidContainer(format!(
                "tag of {} bytes at offset {} exceeds limit",
                len, self.offset
            )));
        }
        let raw = self.bytes(len as usize)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}
