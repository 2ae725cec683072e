//! Audio parameters and output containers
//!
//! ## codec
//! Parameter table for the three `.aa` codecs.
//!
//! ## wav
//! WAVE writer with deferred size fields.
//!
//! ## playlist
//! M3U playlist for per-chapter output.

pub mod codec;
pub mod playlist;
pub mod wav;

// Re-export commonly used types for convenience
pub use codec::{CodecId, CodecParams};
pub use playlist::{PlaylistEntry, PlaylistWriter};
pub use wav::WavWriter;
