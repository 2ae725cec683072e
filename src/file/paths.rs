//! Output path generation
//!
//! Single-file runs write exactly the requested path. Split runs treat it
//! as a prefix:
//!
//! ```text
//! <prefix>-chapter-0.wav
//! <prefix>-chapter-1.wav
//! <prefix>.m3u
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_PART_EXTENSION: &str = "wav";
pub const PLAYLIST_EXTENSION: &str = "m3u";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBuilder {
    base: PathBuf,
    part_extension: String,
}

impl PathBuilder {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            part_extension: DEFAULT_PART_EXTENSION.to_string(),
        }
    }

    pub fn with_part_extension(mut self, extension: impl Into<String>) -> Self {
        self.part_extension = extension.into();
        self
    }

    /// Output path for single-file mode
    pub fn single_output(&self) -> &Path {
        &self.base
    }

    /// Output path of chapter `index` in split mode
    pub fn part_path(&self, index: u32) -> PathBuf {
        self.with_suffix(&format!("-chapter-{}.{}", index, self.part_extension))
    }

    pub fn playlist_path(&self) -> PathBuf {
        self.with_suffix(&format!(".{}", PLAYLIST_EXTENSION))
    }

    /// Name a playlist uses to reference `path`
    pub fn playlist_location(path: &Path) -> String {
        path.file_name()
            .unwrap_or(path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    // appended to the raw OS string so prefixes like "out.d/book" stay intact
    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut raw = OsString::from(self.base.as_os_str());
        raw.push(suffix);
        PathBuf::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paths() {
        let paths = PathBuilder::new("/tmp/out/book");
        assert_eq!(paths.part_path(0), PathBuf::from("/tmp/out/book-chapter-0.wav"));
        assert_eq!(paths.part_path(12), PathBuf::from("/tmp/out/book-chapter-12.wav"));
        assert_eq!(paths.playlist_path(), PathBuf::from("/tmp/out/book.m3u"));
        assert_eq!(paths.single_output(), Path::new("/tmp/out/book"));
    }

    #[test]
    fn test_part_extension() {
        let paths = PathBuilder::new("book").with_part_extension("mp3");
        assert_eq!(paths.part_path(1), PathBuf::from("book-chapter-1.mp3"));
    }

    #[test]
    fn test_playlist_location() {
        assert_eq!(
            PathBuilder::playlist_location(Path::new("/a/b/book-chapter-3.wav")),
            "book-chapter-3.wav"
        );
    }
}
