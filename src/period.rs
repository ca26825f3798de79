//! Period selectors and the calendar arithmetic behind them.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};

const LAST_SECOND_OF_DAY: i64 = 86_399;

/// Symbolic period picked in the dashboard's selector.
///
/// Parsing is total: anything unrecognized becomes [`PeriodToken::ThisMonth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PeriodToken {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    #[default]
    ThisMonth,
    LastMonth,
    /// Trailing window of N days ending today, today included.
    Trailing(TrailingDays),
    ThisQuarter,
    LastQuarter,
    ThisYear,
    LastYear,
}

impl PeriodToken {
    pub const ALL: [PeriodToken; 16] = [
        PeriodToken::Today,
        PeriodToken::Yesterday,
        PeriodToken::ThisWeek,
        PeriodToken::LastWeek,
        PeriodToken::ThisMonth,
        PeriodToken::LastMonth,
        PeriodToken::Trailing(TrailingDays::Seven),
        PeriodToken::Trailing(TrailingDays::Fifteen),
        PeriodToken::Trailing(TrailingDays::Thirty),
        PeriodToken::Trailing(TrailingDays::Sixty),
        PeriodToken::Trailing(TrailingDays::Ninety),
        PeriodToken::Trailing(TrailingDays::OneEighty),
        PeriodToken::ThisQuarter,
        PeriodToken::LastQuarter,
        PeriodToken::ThisYear,
        PeriodToken::LastYear,
    ];

    /// Exact match on the canonical strings; no trimming or numeric coercion.
    pub fn parse(value: &str) -> Self {
        match value {
            "today" => Self::Today,
            "yesterday" => Self::Yesterday,
            "this-week" => Self::ThisWeek,
            "last-week" => Self::LastWeek,
            "this-month" => Self::ThisMonth,
            "last-month" => Self::LastMonth,
            "this-quarter" => Self::ThisQuarter,
            "last-quarter" => Self::LastQuarter,
            "this-year" => Self::ThisYear,
            "last-year" => Self::LastYear,
            "7" => Self::Trailing(TrailingDays::Seven),
            "15" => Self::Trailing(TrailingDays::Fifteen),
            "30" => Self::Trailing(TrailingDays::Thirty),
            "60" => Self::Trailing(TrailingDays::Sixty),
            "90" => Self::Trailing(TrailingDays::Ninety),
            "180" => Self::Trailing(TrailingDays::OneEighty),
            _ => Self::ThisMonth,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "this-week",
            Self::LastWeek => "last-week",
            Self::ThisMonth => "this-month",
            Self::LastMonth => "last-month",
            Self::Trailing(window) => window.as_str(),
            Self::ThisQuarter => "this-quarter",
            Self::LastQuarter => "last-quarter",
            Self::ThisYear => "this-year",
            Self::LastYear => "last-year",
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Today => "Today".to_string(),
            Self::Yesterday => "Yesterday".to_string(),
            Self::ThisWeek => "This week".to_string(),
            Self::LastWeek => "Last week".to_string(),
            Self::ThisMonth => "This month".to_string(),
            Self::LastMonth => "Last month".to_string(),
            Self::Trailing(window) => format!("Last {} days", window.days()),
            Self::ThisQuarter => "This quarter".to_string(),
            Self::LastQuarter => "Last quarter".to_string(),
            Self::ThisYear => "This year".to_string(),
            Self::LastYear => "Last year".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrailingDays {
    Seven,
    Fifteen,
    Thirty,
    Sixty,
    Ninety,
    OneEighty,
}

impl TrailingDays {
    pub fn days(self) -> u32 {
        match self {
            Self::Seven => 7,
            Self::Fifteen => 15,
            Self::Thirty => 30,
            Self::Sixty => 60,
            Self::Ninety => 90,
            Self::OneEighty => 180,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Seven => "7",
            Self::Fifteen => "15",
            Self::Thirty => "30",
            Self::Sixty => "60",
            Self::Ninety => "90",
            Self::OneEighty => "180",
        }
    }
}

impl FromStr for PeriodToken {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(value))
    }
}

impl From<String> for PeriodToken {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PeriodToken> for String {
    fn from(token: PeriodToken) -> Self {
        token.as_str().to_string()
    }
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Number of calendar days touched by the range, both ends included.
    pub fn day_count(&self) -> usize {
        let days = (self.end.date() - self.start.date()).num_days().abs();
        days as usize + 1
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Resolves `token` against the calendar fields of `now` (local time).
///
/// Week branches end at midnight instead of 23:59:59.
pub fn resolve(token: PeriodToken, now: NaiveDateTime) -> DateRange {
    try_resolve(token, now.date()).unwrap_or(DateRange {
        start: now,
        end: now,
    })
}

fn try_resolve(token: PeriodToken, today: NaiveDate) -> Option<DateRange> {
    let year = today.year();
    let month0 = today.month0() as i32;

    match token {
        PeriodToken::Today => Some(whole_days(today, today)),
        PeriodToken::Yesterday => {
            let day = today.pred_opt()?;
            Some(whole_days(day, day))
        }
        PeriodToken::ThisWeek => {
            let offset = i64::from(today.weekday().num_days_from_monday());
            let monday = today.checked_sub_signed(Duration::days(offset))?;
            Some(DateRange {
                start: midnight(monday),
                end: midnight(today),
            })
        }
        PeriodToken::LastWeek => {
            let back = i64::from(today.weekday().num_days_from_sunday()) + 6;
            let start = today.checked_sub_signed(Duration::days(back))?;
            let end = start.checked_add_signed(Duration::days(6))?;
            Some(DateRange {
                start: midnight(start),
                end: midnight(end),
            })
        }
        PeriodToken::ThisMonth => month_span(year, month0, month0),
        PeriodToken::LastMonth => month_span(year, month0 - 1, month0 - 1),
        PeriodToken::Trailing(window) => {
            let back = i64::from(window.days()) - 1;
            let start = today.checked_sub_signed(Duration::days(back))?;
            Some(whole_days(start, today))
        }
        PeriodToken::ThisQuarter => {
            let first = (month0 / 3) * 3;
            month_span(year, first, first + 2)
        }
        PeriodToken::LastQuarter => {
            let quarter = month0 / 3;
            let (year, quarter) = if quarter == 0 {
                (year - 1, 3)
            } else {
                (year, quarter - 1)
            };
            month_span(year, quarter * 3, quarter * 3 + 2)
        }
        PeriodToken::ThisYear => month_span(year, 0, 11),
        PeriodToken::LastYear => month_span(year - 1, 0, 11),
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    midnight(date) + Duration::seconds(LAST_SECOND_OF_DAY)
}

fn whole_days(first: NaiveDate, last: NaiveDate) -> DateRange {
    DateRange {
        start: midnight(first),
        end: end_of_day(last),
    }
}

/// From the first day of `first_month0` to the last day of `last_month0`.
/// Month indexes are zero based and may overflow the year in either
/// direction.
fn month_span(year: i32, first_month0: i32, last_month0: i32) -> Option<DateRange> {
    let start = month_start(year, first_month0)?;
    let end = month_start(year, last_month0 + 1)?.pred_opt()?;
    Some(whole_days(start, end))
}

fn month_start(year: i32, month0: i32) -> Option<NaiveDate> {
    let year = year + month0.div_euclid(12);
    let month = month0.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}
