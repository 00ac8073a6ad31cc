//! Sort run configuration
//!
//! Settings resolve in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. TOML config file (`--config`, or the platform config dir)
//! 3. Compiled defaults

use ebms_common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How matched files are grouped under the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderGroup {
    /// Date first, then one folder per checklist
    #[default]
    Date,
    /// Region / subregion / location first, then date_checklist folders
    Location,
}

impl std::str::FromStr for FolderGroup {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(FolderGroup::Date),
            "location" => Ok(FolderGroup::Location),
            other => Err(format!("unknown folder grouping: {other}")),
        }
    }
}

/// Complete configuration for one sort run.
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Directory scanned recursively for media files
    pub media_dir: PathBuf,
    /// eBird checklist export CSV; without it every file falls back to
    /// date-only folders
    pub csv_path: Option<PathBuf>,
    /// Directory the output tree is created under (defaults to `media_dir`)
    pub output_dir: Option<PathBuf>,
    /// Whole-hour shift applied to embedded metadata timestamps
    pub hrs_offset: i64,
    /// Grouping scheme for checklist-matched files
    pub folder_group: FolderGroup,
    /// Keep the sorted tree in an `ebird` subdirectory; when off, the
    /// sorted folders land directly in the output root
    pub create_subdir: bool,
    /// Insert a year directory between the output root and the groups
    pub sep_year: bool,
    /// Symlink files into place instead of moving them
    pub use_symlinks: bool,
    /// Transcode placed videos to seekable mp4 with ffmpeg
    pub transcode_videos: bool,
    /// Extract an mp3 audio track from each placed video
    pub extract_audio: bool,
}

impl SortConfig {
    pub fn new(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
            csv_path: None,
            output_dir: None,
            hrs_offset: 0,
            folder_group: FolderGroup::Date,
            create_subdir: true,
            sep_year: false,
            use_symlinks: false,
            transcode_videos: false,
            extract_audio: false,
        }
    }

    /// Root the output tree is created under.
    pub fn output_root(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.media_dir)
    }

    /// Check the configuration is runnable.
    pub fn validate(&self) -> Result<()> {
        if !self.media_dir.is_dir() {
            return Err(Error::Config(format!(
                "media directory not found: {}",
                self.media_dir.display()
            )));
        }
        if let Some(csv) = &self.csv_path {
            if !csv.is_file() {
                return Err(Error::Config(format!(
                    "checklist CSV not found: {}",
                    csv.display()
                )));
            }
        }
        if let Some(out) = &self.output_dir {
            if !out.is_dir() {
                return Err(Error::Config(format!(
                    "output directory not found: {}",
                    out.display()
                )));
            }
        }
        Ok(())
    }

    /// Overlay values from a TOML config file onto this configuration.
    ///
    /// Only keys present in the file are applied. Callers layer this
    /// below command-line values: file first, then CLI overrides.
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        if let Some(csv) = file.csv_path {
            self.csv_path = Some(csv);
        }
        if let Some(out) = file.output_dir {
            self.output_dir = Some(out);
        }
        if let Some(offset) = file.hrs_offset {
            self.hrs_offset = offset;
        }
        if let Some(group) = file.folder_group {
            self.folder_group = group;
        }
        if let Some(v) = file.create_subdir {
            self.create_subdir = v;
        }
        if let Some(v) = file.sep_year {
            self.sep_year = v;
        }
        if let Some(v) = file.use_symlinks {
            self.use_symlinks = v;
        }
        if let Some(v) = file.transcode_videos {
            self.transcode_videos = v;
        }
        if let Some(v) = file.extract_audio {
            self.extract_audio = v;
        }
        Ok(())
    }
}

/// Default config file location for the platform, if it exists.
pub fn default_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("ebms").join("config.toml");
    path.is_file().then_some(path)
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    csv_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    hrs_offset: Option<i64>,
    folder_group: Option<FolderGroup>,
    create_subdir: Option<bool>,
    sep_year: Option<bool>,
    use_symlinks: Option<bool>,
    transcode_videos: Option<bool>,
    extract_audio: Option<bool>,
}
