use crate::period::DateRange;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Anything carrying a creation instant. Only the instant is consumed.
pub trait TimestampedRecord {
    fn created_at(&self) -> Option<NaiveDateTime>;
}

impl TimestampedRecord for NaiveDateTime {
    fn created_at(&self) -> Option<NaiveDateTime> {
        Some(*self)
    }
}

impl<T: TimestampedRecord> TimestampedRecord for Option<T> {
    fn created_at(&self) -> Option<NaiveDateTime> {
        self.as_ref().and_then(TimestampedRecord::created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub range: DateRange,
}

impl DailySeries {
    /// One zero bucket per day of `range`, labelled with the day of month.
    pub fn empty(range: &DateRange) -> Self {
        let day_count = range.day_count();
        let labels = range
            .start
            .date()
            .iter_days()
            .take(day_count)
            .map(|date| date.format("%d").to_string())
            .collect();

        Self {
            labels,
            values: vec![0; day_count],
            range: *range,
        }
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

pub fn bucketize<R: TimestampedRecord>(range: &DateRange, records: &[R]) -> DailySeries {
    let mut series = DailySeries::empty(range);
    let day_count = series.values.len() as i64;

    for instant in records.iter().filter_map(TimestampedRecord::created_at) {
        if !range.contains(instant) {
            continue;
        }
        // instant >= start here, so truncation is a floor.
        let days_diff = (instant - range.start).num_days();
        if (0..day_count).contains(&days_diff) {
            series.values[days_diff as usize] += 1;
        }
    }

    series
}

/// Epoch milliseconds, as the clients API sometimes emits, in local time.
pub fn parse_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis)
        .map(|instant| instant.with_timezone(&Local).naive_local())
}

/// Reads the timestamp formats the clients API is known to emit.
///
/// Offset-carrying values are converted to local time; naive values are
/// taken as local already. A bare date means local midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Local).naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{PeriodToken, TrailingDays, resolve};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
    }

    #[test]
    fn trailing_seven_days_gives_seven_buckets_ending_today() {
        let range = resolve(PeriodToken::Trailing(TrailingDays::Seven), now());
        let series = bucketize::<NaiveDateTime>(&range, &[]);
        assert_eq!(series.values.len(), 7);
        assert_eq!(series.labels.len(), 7);
        assert_eq!(series.labels.last().map(String::as_str), Some("05"));
        assert_eq!(series.labels.first().map(String::as_str), Some("28"));
    }

    #[test]
    fn month_buckets_match_days_in_month() {
        let range = resolve(PeriodToken::ThisMonth, now());
        let series = DailySeries::empty(&range);
        assert_eq!(series.values.len(), 31);
        assert_eq!(series.labels[0], "01");
        assert_eq!(series.labels[30], "31");
        assert!(series.values.iter().all(|value| *value == 0));
    }

    #[test]
    fn record_on_first_day_lands_in_first_bucket() {
        let range = resolve(PeriodToken::ThisMonth, now());
        let records = [parse_timestamp("2024-03-01")];
        let series = bucketize(&range, &records);
        assert_eq!(series.values[0], 1);
        assert!(series.values[1..].iter().all(|value| *value == 0));
    }

    #[test]
    fn records_outside_range_or_without_timestamp_are_ignored() {
        let range = resolve(PeriodToken::ThisMonth, now());
        let records = [
            parse_timestamp("2024-02-29 23:59:59"),
            parse_timestamp("2024-04-01 00:00:00"),
            parse_timestamp("not a date"),
            None,
            parse_timestamp("2024-03-31 23:59:59"),
            parse_timestamp("2024-03-10 08:00:00"),
            parse_timestamp("2024-03-10T21:45:00"),
        ];
        let series = bucketize(&range, &records);
        assert_eq!(series.total(), 3);
        assert_eq!(series.values[9], 2);
        assert_eq!(series.values[30], 1);
    }

    #[test]
    fn this_week_excludes_records_after_todays_midnight() {
        let range = resolve(PeriodToken::ThisWeek, now());
        let records = [
            parse_timestamp("2024-03-04 10:00:00"),
            parse_timestamp("2024-03-05 00:00:00"),
            parse_timestamp("2024-03-05 08:00:00"),
        ];
        let series = bucketize(&range, &records);
        assert_eq!(series.values, vec![1, 1]);
    }

    #[test]
    fn bucketize_is_idempotent() {
        let range = resolve(PeriodToken::Trailing(TrailingDays::Thirty), now());
        let records = [
            parse_timestamp("2024-02-20 12:00:00"),
            parse_timestamp("2024-03-05 01:00:00"),
        ];
        assert_eq!(bucketize(&range, &records), bucketize(&range, &records));
    }

    #[test]
    fn parse_timestamp_accepts_known_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01 10:20:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:20:30"), Some(expected));
        assert_eq!(
            parse_timestamp(" 2024-03-01 10:20:30.250 ").map(|t| t.date()),
            Some(expected.date())
        );
        assert!(parse_timestamp("2024-03-01T10:20:30Z").is_some());
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("01/03/2024"), None);
    }
}
