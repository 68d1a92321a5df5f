//! Calendar fields derived from event timestamps.

use super::models::TimeRecord;
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

/// Text form of `start_time` shared by the `time` and `songplays` tables, so
/// the two join on plain string equality.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Convert epoch milliseconds to a UTC timestamp. `None` when out of range.
pub fn timestamp_from_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

impl TimeRecord {
    pub fn from_timestamp(timestamp: &NaiveDateTime) -> Self {
        TimeRecord {
            start_time: format_timestamp(timestamp),
            hour: timestamp.hour(),
            day: timestamp.day(),
            week: timestamp.iso_week().week(),
            month: timestamp.month(),
            year: timestamp.year(),
            weekday: timestamp.weekday().num_days_from_monday(),
        }
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        timestamp_from_millis(millis).map(|ts| TimeRecord::from_timestamp(&ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_record_from_millis() {
        // 2018-11-01 21:01:46.796 UTC, a Thursday
        let record = TimeRecord::from_millis(1541106106796).unwrap();
        assert_eq!(
            record,
            TimeRecord {
                start_time: "2018-11-01 21:01:46.796".to_string(),
                hour: 21,
                day: 1,
                week: 44,
                month: 11,
                year: 2018,
                weekday: 3,
            }
        );
    }

    #[test]
    fn test_iso_week_crosses_year_boundary() {
        // 2018-12-31 is in ISO week 1 of 2019; the calendar year stays 2018
        let record = TimeRecord::from_millis(1546214400000).unwrap();
        assert_eq!(record.start_time, "2018-12-31 00:00:00.000");
        assert_eq!(record.week, 1);
        assert_eq!(record.year, 2018);
        assert_eq!(record.weekday, 0);
    }

    #[test]
    fn test_out_of_range_millis() {
        assert!(TimeRecord::from_millis(i64::MAX).is_none());
    }
}
