//! Timestamp parsing for admission, discharge and birth dates.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;

use crate::error::{Result, TransformError};
use crate::frame::locate_row;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Parses a timestamp; date-only values are taken at midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Elapsed days between admission and discharge. Negative when the
/// discharge precedes the admission.
pub fn length_of_stay_days(admit: NaiveDateTime, discharge: NaiveDateTime) -> f64 {
    (discharge - admit).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Age in whole years from calendar dates, using 365-day years and
/// round-half-to-even.
pub fn age_years(admit: NaiveDateTime, dob: NaiveDateTime) -> f64 {
    let days = (admit.date() - dob.date()).num_days();
    (days as f64 / 365.0).round_ties_even()
}

/// Parses every cell of a text column. Nulls stay `None`; any other
/// unparseable cell fails with the offending row.
pub fn parse_timestamp_column(df: &DataFrame, column: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let values = df.column(column)?.str()?;
    let mut parsed = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        let stamp = match value {
            None => None,
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| {
                TransformError::Timestamp {
                    column: column.to_string(),
                    value: raw.to_string(),
                    at: locate_row(df, row),
                }
            })?),
        };
        parsed.push(stamp);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> NaiveDateTime {
        parse_timestamp(value).unwrap()
    }

    #[test]
    fn parses_supported_formats() {
        let expected = NaiveDate::from_ymd_opt(2150, 1, 5)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(ts("2150-01-05 08:00:00"), expected);
        assert_eq!(ts("2150-01-05 08:00"), expected);
        assert_eq!(ts("2150-01-05T08:00:00"), expected);
        assert_eq!(ts(" 2150-01-05T08:00 "), expected);
        assert_eq!(ts("2150-01-05 08:00:00.000"), expected);
        assert_eq!(
            ts("2150-01-05"),
            NaiveDate::from_ymd_opt(2150, 1, 5)
                .unwrap()
                .and_time(NaiveTime::MIN)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("05/01/2150").is_none());
        assert!(parse_timestamp("2150-13-01").is_none());
    }

    #[test]
    fn length_of_stay_in_days() {
        let los = length_of_stay_days(ts("2150-01-05 08:00"), ts("2150-01-10 08:00"));
        assert_eq!(los, 5.0);
        let half = length_of_stay_days(ts("2150-01-05 08:00"), ts("2150-01-05 20:00"));
        assert_eq!(half, 0.5);
        assert!(length_of_stay_days(ts("2150-01-05"), ts("2150-01-04")) < 0.0);
    }

    #[test]
    fn age_rounds_to_whole_years() {
        assert_eq!(age_years(ts("2150-06-01"), ts("2090-06-01")), 60.0);
        assert_eq!(age_years(ts("2150-06-01"), ts("2045-01-01")), 105.0);
        // 548 and 546 days sit either side of a year and a half.
        assert_eq!(age_years(ts("2001-07-02 12:00"), ts("2000-01-01")), 2.0);
        assert_eq!(age_years(ts("2001-06-30"), ts("2000-01-01")), 1.0);
    }

    #[test]
    fn column_parse_reports_row() {
        let df = df!(
            "subject_id" => [1i64, 2],
            "admittime" => [Some("2150-01-05"), Some("not a date")],
        )
        .unwrap();
        let err = parse_timestamp_column(&df, "admittime").unwrap_err();
        match err {
            TransformError::Timestamp { value, at, .. } => {
                assert_eq!(value, "not a date");
                assert_eq!(at.row, 1);
                assert_eq!(at.subject_id, Some(2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
