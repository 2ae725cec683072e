//! Decryption runs
//!
//! Ties the codec table, key derivation, TOC lookup, chapter demuxer and
//! output writers together into a single call.
//!
//! # Output Modes
//! - **Single**: all chapters concatenated into one WAVE container
//! - **Split**: one container per chapter plus an M3U playlist listing the
//!   parts with their (truncated) durations

pub mod decrypter;
pub mod options;
pub mod progress;

// Re-export commonly used types
pub use decrypter::{AaDecrypter, ChapterSummary, DecryptSummary};
pub use options::DecryptOptions;
pub use progress::{DecryptProgress, ProgressCallback};
