//! Media kind classification by file extension

use std::path::Path;

/// Image formats eBird accepts, including the common camera raw families.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "crx", "crw", "cr2", "cr3", "crm", "arw", "nef", "orf", "raf",
];

const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a"];

const VIDEO_EXTENSIONS: &[&str] = &["mov", "m4v", "mp4", "avi"];

/// Broad media category a file falls into, decided purely by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    /// Classify by extension string (any case). `None` for non-media files.
    pub fn from_extension(ext: &str) -> Option<MediaKind> {
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Audio)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Classify a path by its extension. `None` for non-media files or
    /// paths without an extension.
    pub fn from_path(path: &Path) -> Option<MediaKind> {
        file_extension(path).and_then(|ext| MediaKind::from_extension(&ext))
    }
}

/// Lowercased extension of a path, if it has one.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// File name without its final extension, as UTF-8.
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(String::from)
}
