//! Desktop CLI for `.aa` decryption
//!
//! ```bash
//! aa-decrypt book.aa book.wav
//! aa-decrypt --split book.aa out/book
//! ```

use aa_core::{AaDecrypter, DecryptOptions, DecryptProgress};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aa-decrypt", version, about = "Decrypt Audible .aa audiobooks to WAVE")]
struct Cli {
    /// Encrypted .aa file
    input: PathBuf,

    /// Output file, or path prefix with --split
    output: PathBuf,

    /// Write one file per chapter plus an .m3u playlist
    #[arg(long)]
    split: bool,

    /// JSON file with decryption options
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    summary_json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut options = match &cli.options {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading options from {}", path.display()))?;
            DecryptOptions::from_json(&json)?
        }
        None => DecryptOptions::default(),
    };
    options.split |= cli.split;

    let decrypter = AaDecrypter::new(options).with_progress(Arc::new(|p: DecryptProgress| {
        info!(
            chapters = p.chapters_completed,
            seconds = p.cumulative_seconds,
            "{:.1}% decrypted",
            p.progress_percentage
        );
    }));

    let summary = decrypter
        .decrypt_file(&cli.input, &cli.output)
        .with_context(|| format!("decrypting {}", cli.input.display()))?;

    if cli.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Decrypted {} chapter(s), {} bytes, ~{} seconds ({})",
            summary.chapters.len(),
            summary.bytes_written,
            summary.total_seconds,
            summary.codec.as_str()
        );
        for output in &summary.outputs {
            println!("  {}", output.display());
        }
        if let Some(playlist) = &summary.playlist {
            println!("  {}", playlist.display());
        }
    }

    Ok(())
}
