//! ebms - eBird media sorter CLI

use anyhow::Context;
use clap::Parser;
use ebms_sorter::config::{default_config_file, SortConfig};
use ebms_sorter::{FolderGroup, SortEvent, SortTask};
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "ebms")]
#[command(about = "Sort eBird media files into checklist-aligned folders")]
struct Args {
    /// Directory scanned recursively for media files
    media_dir: PathBuf,

    /// eBird checklist export CSV (MyEBirdData.csv)
    #[arg(long, env = "EBMS_CSV")]
    csv: Option<PathBuf>,

    /// Directory to create the output tree under (defaults to MEDIA_DIR)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Whole-hour shift applied to embedded metadata timestamps
    #[arg(long)]
    offset: Option<i64>,

    /// Folder grouping: date or location (default date)
    #[arg(long)]
    group: Option<FolderGroup>,

    /// Sort directly into the output root instead of an `ebird` subdirectory
    #[arg(long)]
    no_subdir: bool,

    /// Insert a year directory above the groups
    #[arg(long)]
    sep_year: bool,

    /// Symlink files into place instead of moving them
    #[arg(long)]
    symlink: bool,

    /// Transcode placed videos to seekable mp4 (requires ffmpeg)
    #[arg(long)]
    transcode: bool,

    /// Extract an mp3 audio track from each placed video (requires ffmpeg)
    #[arg(long)]
    extract_audio: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "EBMS_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Config file first, then command-line overrides
    let mut config = SortConfig::new(args.media_dir);
    if let Some(file) = args.config.or_else(default_config_file) {
        info!(path = %file.display(), "Loading config file");
        config
            .apply_file(&file)
            .with_context(|| format!("loading {}", file.display()))?;
    }
    if let Some(csv) = args.csv {
        config.csv_path = Some(csv);
    }
    if let Some(output) = args.output {
        config.output_dir = Some(output);
    }
    if let Some(offset) = args.offset {
        config.hrs_offset = offset;
    }
    if let Some(group) = args.group {
        config.folder_group = group;
    }
    if args.no_subdir {
        config.create_subdir = false;
    }
    if args.sep_year {
        config.sep_year = true;
    }
    if args.symlink {
        config.use_symlinks = true;
    }
    if args.transcode {
        config.transcode_videos = true;
    }
    if args.extract_audio {
        config.extract_audio = true;
    }

    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            match event {
                SortEvent::PhaseChanged(phase) => info!(?phase, "Phase changed"),
                SortEvent::Progress(fraction) => {
                    // Placement progress at 10% steps
                    let pct = (fraction * 100.0) as u32;
                    if pct % 10 == 0 {
                        info!("Placing: {pct}%");
                    }
                }
                SortEvent::Log(message) => info!("{message}"),
            }
        }
    });

    let task = SortTask::with_events(config, tx);
    let report = task.run().context("sort run failed")?;
    drop(task);
    let _ = printer.join();

    match &report.output_dir {
        Some(dir) => info!(output = %dir.display(), "Sorted tree"),
        None => info!("No eligible media files found"),
    }
    info!(
        placed = report.files_placed,
        matched = report.files_matched,
        duplicates = report.duplicates_removed,
        conflicts = report.conflicts,
        adjusted = report.exif_adjusted,
        transcoded = report.videos_transcoded,
        extracted = report.audio_extracted,
        "Done"
    );
    if let Some(csv) = &report.summary_csv {
        info!(path = %csv.display(), "Summary index");
    }
    Ok(())
}
