//! Lossless EXIF capture-time rewrite
//!
//! After placement, JPEGs whose resolved capture time disagrees with their
//! embedded DateTimeOriginal get the tag rewritten in place, without
//! re-encoding image data. Phone photos (Apple or Google Make) are left
//! alone: their clocks are network-synced and trusted over any offset or
//! fallback source.

use chrono::NaiveDateTime;
use ebms_common::time::EXIF_DATETIME_FORMAT;
use ebms_common::{media, Error, Result};
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Result of one adjustment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustOutcome {
    /// DateTimeOriginal rewritten to the resolved time
    Adjusted,
    /// Tag already agreed with the resolved time
    AlreadyCorrect,
    /// Non-JPEG, unreadable EXIF, or a trusted phone camera
    Skipped,
}

pub struct ExifAdjuster;

impl ExifAdjuster {
    /// Rewrite DateTimeOriginal in `path` to `resolved` when appropriate.
    pub fn adjust(&self, path: &Path, resolved: NaiveDateTime) -> Result<AdjustOutcome> {
        let is_jpeg = matches!(
            media::file_extension(path).as_deref(),
            Some("jpg") | Some("jpeg")
        );
        if !is_jpeg {
            return Ok(AdjustOutcome::Skipped);
        }

        let Some(embedded) = read_exif(path) else {
            // No readable EXIF means nothing trustworthy to correct
            return Ok(AdjustOutcome::Skipped);
        };

        if let Some(make) = &embedded.make {
            if is_phone_make(make) {
                tracing::debug!(path = %path.display(), make, "Phone photo, leaving EXIF alone");
                return Ok(AdjustOutcome::Skipped);
            }
        }

        let formatted = resolved.format(EXIF_DATETIME_FORMAT).to_string();
        if embedded.date_time_original.as_deref() == Some(formatted.as_str()) {
            return Ok(AdjustOutcome::AlreadyCorrect);
        }

        let mut metadata = Metadata::new_from_path(path)
            .map_err(|e| Error::metadata(path, e.to_string()))?;
        metadata.set_tag(ExifTag::DateTimeOriginal(formatted.clone()));
        metadata
            .write_to_file(path)
            .map_err(|e| Error::metadata(path, e.to_string()))?;

        tracing::info!(
            path = %path.display(),
            old = embedded.date_time_original.as_deref().unwrap_or("(none)"),
            new = %formatted,
            "Rewrote EXIF capture time"
        );
        Ok(AdjustOutcome::Adjusted)
    }
}

struct EmbeddedFields {
    make: Option<String>,
    date_time_original: Option<String>,
}

fn read_exif(path: &Path) -> Option<EmbeddedFields> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

    let ascii = |tag: exif::Tag| -> Option<String> {
        let field = exif.get_field(tag, exif::In::PRIMARY)?;
        if let exif::Value::Ascii(ref vec) = field.value {
            vec.first()
                .and_then(|bytes| std::str::from_utf8(bytes).ok())
                .map(|s| s.trim().to_string())
        } else {
            None
        }
    };

    Some(EmbeddedFields {
        make: ascii(exif::Tag::Make),
        date_time_original: ascii(exif::Tag::DateTimeOriginal),
    })
}

/// Phone vendors whose camera clocks are trusted as-is.
pub fn is_phone_make(make: &str) -> bool {
    let make = make.to_ascii_lowercase();
    make.contains("apple") || make.contains("google")
}
