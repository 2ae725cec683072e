//! Extended M3U playlist for split output
//!
//! ```text
//! #EXTM3U
//!
//! #EXTINF:<seconds>,<title>
//! <file>
//! ```

use crate::error::{AaError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const M3U_HEADER: &str = "#EXTM3U";

/// One playlist record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Duration in whole seconds
    pub seconds: u32,
    pub title: String,
    /// File name, relative to the playlist
    pub location: String,
}

pub struct PlaylistWriter<W: Write = File> {
    path: PathBuf,
    out: BufWriter<W>,
    entries: usize,
}

impl PlaylistWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| AaError::io(path, e))?;
        Self::new(file, path)
    }
}

impl<W: Write> PlaylistWriter<W> {
    /// Start a playlist on `inner`, writing the `#EXTM3U` line
    pub fn new(inner: W, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut out = BufWriter::new(inner);
        writeln!(out, "{}", M3U_HEADER).map_err(|e| AaError::io(&path, e))?;
        Ok(Self {
            path,
            out,
            entries: 0,
        })
    }

    pub fn add(&mut self, entry: &PlaylistEntry) -> Result<()> {
        write!(
            self.out,
            "\n#EXTINF:{},{}\n{}\n",
            entry.seconds, entry.title, entry.location
        )
        .map_err(|e| AaError::io(&self.path, e))?;
        self.entries += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Flush and return the inner writer
    pub fn finish(self) -> Result<W> {
        let path = self.path;
        self.out
            .into_inner()
            .map_err(|e| AaError::io(&path, e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_format() {
        let mut playlist = PlaylistWriter::new(Vec::new(), "book.m3u").unwrap();
        assert!(playlist.is_empty());

        playlist
            .add(&PlaylistEntry {
                seconds: 1,
                title: "Book - Chapter 0".into(),
                location: "book-chapter-0.wav".into(),
            })
            .unwrap();
        playlist
            .add(&PlaylistEntry {
                seconds: 0,
                title: "Book - Chapter 1".into(),
                location: "book-chapter-1.wav".into(),
            })
            .unwrap();
        assert_eq!(playlist.len(), 2);

        let text = String::from_utf8(playlist.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "#EXTM3U\n\n#EXTINF:1,Book - Chapter 0\nbook-chapter-0.wav\n\n#EXTINF:0,Book - Chapter 1\nbook-chapter-1.wav\n"
        );
    }

    #[test]
    fn test_empty_playlist() {
        let playlist = PlaylistWriter::new(Vec::new(), "empty.m3u").unwrap();
        assert_eq!(playlist.finish().unwrap(), b"#EXTM3U\n".to_vec());
    }
}
