//! aa-core
//!
//! Decryption of Audible `.aa` audiobooks into WAVE containers.
//!
//! ```no_run
//! use aa_core::{AaDecrypter, DecryptOptions};
//!
//! let summary = AaDecrypter::new(DecryptOptions::split())
//!     .decrypt_file("book.aa", "out/book")?;
//! println!("{} chapters", summary.chapters.len());
//! # Ok::<(), aa_core::AaError>(())
//! ```

// Core modules
pub mod error;
pub mod audio;
pub mod container;
pub mod crypto;
pub mod decrypt;
pub mod file;

// Re-export commonly used types for convenience
pub use error::{AaError, Result};
pub use container::{AaHeader, HeaderFields, HeaderSource, TocEntry};
pub use decrypt::{AaDecrypter, DecryptOptions, DecryptProgress, DecryptSummary};
