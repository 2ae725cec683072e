//! Source container access
//!
//! The pipeline consumes header fields through [`HeaderSource`]; [`AaHeader`]
//! reads them from an `.aa` file.

pub mod header;
pub mod reader;
pub mod toc;

// Re-export commonly used types
pub use header::{HeaderFields, HeaderSource, TocEntry};
pub use reader::AaHeader;
pub use toc::locate_audio_region;
