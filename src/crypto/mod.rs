//! Cryptography and DRM removal
//!
//! This module handles decryption of Audible's legacy `.aa` format.
//!
//! # DRM Format
//! - **Cipher**: TEA, 16 rounds, ECB over 8-byte blocks
//! - **Content key**: masked in the header, unmasked with a TEA keystream
//!   seeded by the `HeaderSeed` tag
//! - **Payload**: chapter-segmented, partial cipher blocks left in the clear

pub mod aa;
pub mod kdf;
pub mod tea;

// Re-export commonly used types
pub use aa::{Chapter, ChapterDemuxer, ChapterHeader, DemuxCursor, PayloadSink};
pub use kdf::derive_key;
pub use tea::Tea;
