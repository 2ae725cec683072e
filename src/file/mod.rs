//! File management and path utilities
//!
//! This module handles output naming for single and split runs.

pub mod paths;

// Re-export commonly used types
pub use paths::PathBuilder;
