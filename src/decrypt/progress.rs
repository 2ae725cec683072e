// LibriSync - Audible Library Sync for Mobile
// Copyright (C) 2025 Henning Berge
//
// This program is a Rust port of Libation (https://github.com/rmcrackan/Libation)
// Original work Copyright (C) Libation contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Decryption progress tracking and reporting

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Decryption progress information
///
/// Passed to progress callbacks once per completed chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecryptProgress {
    /// Chapters completed so far
    pub chapters_completed: u32,

    /// Bytes of the audio region consumed, chapter headers included
    pub bytes_consumed: u64,

    /// Size of the audio region in bytes
    pub total_bytes: u64,

    /// Plaintext bytes written across all outputs
    pub bytes_written: u64,

    /// Audio duration decrypted so far, truncated per chapter
    pub cumulative_seconds: u64,

    /// Progress as a percentage (0.0 - 100.0)
    pub progress_percentage: f64,
}

impl DecryptProgress {
    /// Create a new progress report
    pub fn new(bytes_consumed: u64, total_bytes: u64) -> Self {
        let mut progress = Self {
            total_bytes,
            ..Self::default()
        };
        progress.update_bytes(bytes_consumed);
        progress
    }

    /// Update consumed bytes and recalculate the percentage
    pub fn update_bytes(&mut self, bytes_consumed: u64) {
        self.bytes_consumed = bytes_consumed;
        self.progress_percentage = if self.total_bytes > 0 {
            (bytes_consumed.min(self.total_bytes) as f64 / self.total_bytes as f64) * 100.0
        } else {
            100.0
        };
    }

    /// Check if the whole audio region has been consumed
    pub fn is_complete(&self) -> bool {
        self.bytes_consumed >= self.total_bytes
    }

    /// Get progress as a fraction (0.0 - 1.0)
    pub fn as_fraction(&self) -> f64 {
        self.progress_percentage / 100.0
    }
}

/// Type alias for progress callback functions
pub type ProgressCallback = Arc<dyn Fn(DecryptProgress) + Send + Sync>;
