//! Timestamp formats and parsing helpers
//!
//! Every timestamp in the sorter is a camera-local `NaiveDateTime`; the
//! checklist export and embedded media metadata carry no usable zone
//! information, so none is invented.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// EXIF DateTimeOriginal format (`2023:05:01 07:45:00`)
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Checklist export date + start time (`2023-05-01 07:30 AM`)
pub const CHECKLIST_DATETIME_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Date segment used in destination folder names
pub const FOLDER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp column of the summary index CSV
pub const INDEX_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Fallback capture time for files whose modification time reads as epoch
/// zero.
pub fn epoch_default() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .expect("valid constant date")
        .and_hms_opt(0, 0, 0)
        .expect("valid constant time")
}

/// Parse a timestamp string with the given format, logging and yielding
/// `None` on malformed input so resolver chains can fall through.
pub fn parse_time(value: &str, format: &str) -> Option<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(value, format) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::warn!(value, format, error = %e, "Unparseable timestamp");
            None
        }
    }
}

/// Shift a timestamp by whole hours; a zero offset is the identity.
pub fn apply_offset(dt: NaiveDateTime, hrs_offset: i64) -> NaiveDateTime {
    if hrs_offset == 0 {
        dt
    } else {
        dt + Duration::hours(hrs_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exif_datetime() {
        let dt = parse_time("2023:05:01 07:45:00", EXIF_DATETIME_FORMAT).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-05-01 07:45:00");
    }

    #[test]
    fn parses_checklist_datetime_with_meridiem() {
        let dt = parse_time("2023-05-01 07:30 AM", CHECKLIST_DATETIME_FORMAT).unwrap();
        assert_eq!(dt.format(INDEX_DATETIME_FORMAT).to_string(), "2023-05-01 07:30");

        let pm = parse_time("2023-05-01 07:30 PM", CHECKLIST_DATETIME_FORMAT).unwrap();
        assert_eq!(pm.format(INDEX_DATETIME_FORMAT).to_string(), "2023-05-01 19:30");
    }

    #[test]
    fn malformed_timestamp_yields_none() {
        assert!(parse_time("not a date", EXIF_DATETIME_FORMAT).is_none());
        assert!(parse_time("2023:13:99 07:45:00", EXIF_DATETIME_FORMAT).is_none());
    }

    #[test]
    fn offset_shifts_hours() {
        let dt = parse_time("2023:05:01 07:45:00", EXIF_DATETIME_FORMAT).unwrap();
        let shifted = apply_offset(dt, -5);
        assert_eq!(shifted.format("%H:%M").to_string(), "02:45");
        assert_eq!(apply_offset(dt, 0), dt);
    }

    #[test]
    fn epoch_default_is_nineteen_hundred() {
        assert_eq!(
            epoch_default().format(FOLDER_DATE_FORMAT).to_string(),
            "1900-01-01"
        );
    }
}
