//! Codec parameter table
//!
//! Maps the `codec` tag of an `.aa` header to the parameters needed to
//! partition the encrypted payload and describe it in the output header.
//!
//! | Tag | Second size | Format tag | Block align | Sample rate |
//! | --- | --- | --- | --- | --- |
//! | `mp332` | 3982 | `0x55` (MP3) | 1 | 22050 |
//! | `acelp16` | 2000 | `0x130` (ACELP.net) | 20 | 16000 |
//! | `acelp85` | 1045 | `0x130` (ACELP.net) | 19 | 8500 |
//!
//! All formats are mono.

use crate::error::{AaError, Result};
use serde::{Deserialize, Serialize};

/// Known codec identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecId {
    /// MP3, 32 kbit/s
    #[serde(rename = "mp332")]
    Mp332,
    /// ACELP.net 16 kbit/s
    #[serde(rename = "acelp16")]
    Acelp16,
    /// ACELP.net 8.5 kbit/s
    #[serde(rename = "acelp85")]
    Acelp85,
}

impl CodecId {
    /// Tag value as it appears in the source header
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecId::Mp332 => "mp332",
            CodecId::Acelp16 => "acelp16",
            CodecId::Acelp85 => "acelp85",
        }
    }
}

impl std::str::FromStr for CodecId {
    type Err = AaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mp332" => Ok(CodecId::Mp332),
            "acelp16" => Ok(CodecId::Acelp16),
            "acelp85" => Ok(CodecId::Acelp85),
            other => Err(AaError::UnknownCodec {
                codec: other.to_string(),
            }),
        }
    }
}

/// Per-codec parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecParams {
    pub codec_id: CodecId,

    /// Payload bytes per second of audio; also the demux block length
    pub seconds_block_size: u32,

    /// WAVE format code
    pub format_tag: u16,

    pub block_align: u16,

    pub sample_rate: u32,

    pub channel_count: u16,
}

const MP3_FORMAT_TAG: u16 = 0x55;
const ACELP_FORMAT_TAG: u16 = 0x130;

impl CodecParams {
    /// Parameters for a known codec
    pub fn for_codec(codec_id: CodecId) -> Self {
        let (seconds_block_size, format_tag, block_align, sample_rate) = match codec_id {
            CodecId::Mp332 => (3982, MP3_FORMAT_TAG, 1, 22050),
            CodecId::Acelp16 => (2000, ACELP_FORMAT_TAG, 20, 16000),
            CodecId::Acelp85 => (1045, ACELP_FORMAT_TAG, 19, 8500),
        };

        Self {
            codec_id,
            seconds_block_size,
            format_tag,
            block_align,
            sample_rate,
            channel_count: 1,
        }
    }

    /// Look up parameters by the `codec` tag value
    ///
    /// # Errors
    /// `AaError::UnknownCodec` for anything outside the table.
    pub fn lookup(codec_name: &str) -> Result<Self> {
        codec_name.parse().map(Self::for_codec)
    }

    /// Whole seconds of audio in `bytes` of payload (truncated)
    pub fn whole_seconds(&self, bytes: u32) -> u32 {
        bytes / self.seconds_block_size
    }
}
