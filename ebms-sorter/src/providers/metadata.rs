//! Embedded metadata provider
//!
//! Reads capture timestamps out of the file itself: EXIF DateTimeOriginal
//! for images, RIFF INFO creation date for WAV, and the container creation
//! time for mp4/mov/m4a. mp3 carries no standard capture time and is left
//! to later providers.

use super::CreationDateProvider;
use chrono::NaiveDateTime;
use ebms_common::time::{self, EXIF_DATETIME_FORMAT};
use ebms_common::{media, MediaKind};
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use nom_exif::{EntryValue, MediaParser, MediaSource, TrackInfo, TrackInfoTag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// WAV recorders write ICRD in a few shapes; date-only means midnight.
const WAV_DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y:%m:%d %H:%M:%S"];

pub struct MetadataProvider {
    hrs_offset: i64,
}

impl MetadataProvider {
    pub fn new(hrs_offset: i64) -> Self {
        Self { hrs_offset }
    }

    /// EXIF capture time plus whether the camera is a trusted phone
    /// vendor (whose clock the hour offset must not shift).
    fn image_date(path: &Path) -> Option<(NaiveDateTime, bool)> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
        let field = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)?;
        let dt = ascii_value(&field.value)
            .and_then(|s| time::parse_time(s.trim(), EXIF_DATETIME_FORMAT))?;
        let phone = exif
            .get_field(exif::Tag::Make, exif::In::PRIMARY)
            .and_then(|f| ascii_value(&f.value))
            .is_some_and(crate::services::exif_adjuster::is_phone_make);
        Some((dt, phone))
    }

    fn wav_date(path: &Path) -> Option<NaiveDateTime> {
        let tagged = Probe::open(path).ok()?.read().ok()?;
        let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
        let raw = tag.get_string(&ItemKey::RecordingDate)?.trim().to_string();

        for format in WAV_DATE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, format) {
                return Some(dt);
            }
        }
        // Date-only ICRD values are common on handheld recorders
        chrono::NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn container_date(path: &Path) -> Option<NaiveDateTime> {
        let mut parser = MediaParser::new();
        let source = MediaSource::file_path(path).ok()?;
        if !source.has_track() {
            return None;
        }
        let info: TrackInfo = parser.parse(source).ok()?;
        match info.get(TrackInfoTag::CreateDate) {
            Some(EntryValue::Time(t)) => Some(t.naive_local()),
            _ => None,
        }
    }
}

impl CreationDateProvider for MetadataProvider {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn creation_date(&self, path: &Path) -> Option<NaiveDateTime> {
        let kind = MediaKind::from_path(path)?;
        let ext = media::file_extension(path)?;

        let (dt, phone) = match kind {
            MediaKind::Image => Self::image_date(path)?,
            MediaKind::Audio => match ext.as_str() {
                "wav" => (Self::wav_date(path)?, false),
                "m4a" => (Self::container_date(path)?, false),
                _ => return None,
            },
            MediaKind::Video => (Self::container_date(path)?, false),
        };

        if phone {
            // Phone clocks are network-synced; the offset corrects
            // cameras with misconfigured clocks, not these
            return Some(dt);
        }
        Some(time::apply_offset(dt, self.hrs_offset))
    }
}

fn ascii_value(value: &exif::Value) -> Option<&str> {
    if let exif::Value::Ascii(ref vec) = value {
        vec.first().and_then(|bytes| std::str::from_utf8(bytes).ok())
    } else {
        None
    }
}
