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

//! `.aa` decryption orchestration
//!
//! # Pipeline
//! 1. Look up the codec (and, for split output, the title) before touching
//!    any output path
//! 2. Locate the audio region in the TOC
//! 3. Derive the content key from the header seed and header key
//! 4. Seek to the audio region and demux chapter by chapter
//! 5. Write one container, or one container per chapter plus a playlist
//!
//! Any error aborts the run. The container being written at that point is
//! closed with its size fields left at zero; containers already finished
//! stay valid.

use crate::audio::codec::{CodecId, CodecParams};
use crate::audio::playlist::{PlaylistEntry, PlaylistWriter};
use crate::audio::wav::WavWriter;
use crate::container::header::{HeaderSource, TocEntry, TAG_CODEC, TAG_TITLE};
use crate::container::reader::AaHeader;
use crate::container::toc::locate_audio_region;
use crate::crypto::aa::{Chapter, ChapterDemuxer};
use crate::crypto::kdf::derive_key;
use crate::decrypt::options::DecryptOptions;
use crate::decrypt::progress::{DecryptProgress, ProgressCallback};
use crate::error::{AaError, Result};
use crate::file::paths::PathBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Outcome of one chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub index: u32,
    pub declared_size: u32,
    pub declared_data_start_offset: u32,
    /// Whole seconds, truncated
    pub seconds: u32,
    pub bytes_written: u64,
    /// Part file in split mode
    pub output: Option<PathBuf>,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptSummary {
    pub codec: CodecId,
    /// TOC entry holding the audio
    pub toc_index: usize,
    pub region: TocEntry,
    pub chapters: Vec<ChapterSummary>,
    /// Bytes consumed from the audio region, chapter headers included
    pub bytes_consumed: u64,
    pub bytes_written: u64,
    pub total_seconds: u64,
    /// Output containers in chapter order
    pub outputs: Vec<PathBuf>,
    pub playlist: Option<PathBuf>,
}

impl DecryptSummary {
    fn new(codec: CodecId, toc_index: usize, region: TocEntry) -> Self {
        Self {
            codec,
            toc_index,
            region,
            chapters: Vec::new(),
            bytes_consumed: 0,
            bytes_written: 0,
            total_seconds: 0,
            outputs: Vec::new(),
            playlist: None,
        }
    }

    fn push_chapter(&mut self, chapter: &Chapter, bytes_written: u64, output: Option<PathBuf>) {
        self.chapters.push(ChapterSummary {
            index: chapter.index,
            declared_size: chapter.header.declared_size,
            declared_data_start_offset: chapter.header.declared_data_start_offset,
            seconds: chapter.seconds,
            bytes_written,
            output,
        });
    }
}

/// Decrypter for `.aa` audio
#[derive(Clone, Default)]
pub struct AaDecrypter {
    options: DecryptOptions,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for AaDecrypter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AaDecrypter")
            .field("options", &self.options)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl AaDecrypter {
    pub fn new(options: DecryptOptions) -> Self {
        Self {
            options,
            progress: None,
        }
    }

    /// Register a callback invoked after every chapter
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn options(&self) -> &DecryptOptions {
        &self.options
    }

    /// Decrypt the `.aa` file at `input`
    ///
    /// `output` is the output file in single mode and the path prefix in
    /// split mode.
    pub fn decrypt_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<DecryptSummary> {
        let input = input.as_ref();
        let header = AaHeader::open(input)?;
        let source = File::open(input).map_err(|e| AaError::io(input, e))?;
        self.decrypt(&header, source, input, output.as_ref())
    }

    /// Decrypt `source` using header fields parsed elsewhere
    ///
    /// `source_path` labels errors.
    pub fn decrypt<H, R>(
        &self,
        header: &H,
        mut source: R,
        source_path: &Path,
        output: &Path,
    ) -> Result<DecryptSummary>
    where
        H: HeaderSource + ?Sized,
        R: Read + Seek,
    {
        let params = CodecParams::lookup(header.required_tag(TAG_CODEC)?)?;
        let title = if self.options.split {
            Some(header.required_tag(TAG_TITLE)?)
        } else {
            None
        };

        let (toc_index, region) = locate_audio_region(header.toc())?;
        info!(
            codec = params.codec_id.as_str(),
            toc_entries = header.toc().len(),
            toc_index,
            start = region.start,
            end = region.end,
            "Selected audio region"
        );

        let key = derive_key(header.header_seed(), &header.header_key());
        trace!(key = %hex::encode(key), "Derived content key");

        let start = u64::from(region.start);
        source
            .seek(SeekFrom::Start(start))
            .map_err(|e| AaError::io_at(source_path, start, e))?;

        let mut demux =
            ChapterDemuxer::new(BufReader::new(source), source_path, &key, params, region);
        let paths = PathBuilder::new(output).with_part_extension(&self.options.part_extension);
        let mut summary = DecryptSummary::new(params.codec_id, toc_index, region);

        match title {
            Some(title) => self.decrypt_split(&mut demux, &params, &paths, title, &mut summary)?,
            None => self.decrypt_single(&mut demux, &params, &paths, &mut summary)?,
        }

        let cursor = demux.cursor();
        summary.bytes_consumed = cursor.bytes_consumed;
        summary.bytes_written = cursor.total_bytes_written;
        summary.total_seconds = cursor.cumulative_seconds;

        info!(
            chapters = summary.chapters.len(),
            bytes_written = summary.bytes_written,
            total_seconds = summary.total_seconds,
            "Decryption complete"
        );
        Ok(summary)
    }

    fn decrypt_single<R: Read>(
        &self,
        demux: &mut ChapterDemuxer<R>,
        params: &CodecParams,
        paths: &PathBuilder,
        summary: &mut DecryptSummary,
    ) -> Result<()> {
        let output = paths.single_output().to_path_buf();
        let mut writer = WavWriter::create(&output, params)?;

        while let Some(chapter) = demux.next_chapter()? {
            let written = demux.decrypt_chapter(&chapter, &mut writer)?;
            summary.push_chapter(&chapter, written, None);
            self.report(demux);
        }

        writer.finish()?;
        info!(path = %output.display(), "Wrote output container");
        summary.outputs.push(output);
        Ok(())
    }

    fn decrypt_split<R: Read>(
        &self,
        demux: &mut ChapterDemuxer<R>,
        params: &CodecParams,
        paths: &PathBuilder,
        title: &str,
        summary: &mut DecryptSummary,
    ) -> Result<()> {
        let playlist_path = paths.playlist_path();
        let mut playlist = PlaylistWriter::create(&playlist_path)?;

        while let Some(chapter) = demux.next_chapter()? {
            let part = paths.part_path(chapter.index);
            let mut writer = WavWriter::create(&part, params)?;
            let written = demux.decrypt_chapter(&chapter, &mut writer)?;
            writer.finish()?;

            playlist.add(&PlaylistEntry {
                seconds: chapter.seconds,
                title: self.options.chapter_title(title, chapter.index),
                location: PathBuilder::playlist_location(&part),
            })?;

            info!(chapter = chapter.index, path = %part.display(), bytes_written = written, "Wrote chapter");
            summary.push_chapter(&chapter, written, Some(part.clone()));
            summary.outputs.push(part);
            self.report(demux);
        }

        playlist.finish()?;
        debug!(path = %playlist_path.display(), "Wrote playlist");
        summary.playlist = Some(playlist_path);
        Ok(())
    }

    fn report<R: Read>(&self, demux: &ChapterDemuxer<R>) {
        let Some(callback) = &self.progress else {
            return;
        };
        let cursor = demux.cursor();
        let mut progress = DecryptProgress::new(cursor.bytes_consumed, u64::from(demux.region().len()));
        progress.chapters_completed = cursor.chapters;
        progress.bytes_written = cursor.total_bytes_written;
        progress.cumulative_seconds = cursor.cumulative_seconds;
        callback(progress);
    }
}
