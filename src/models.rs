use crate::notifications::Level;
use crate::period::{DateRange, PeriodToken};
use crate::series::{DailySeries, TimestampedRecord, parse_epoch_millis, parse_timestamp};
use crate::ui_state::Theme;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of the upstream clients endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientsResponse {
    #[serde(default)]
    pub clients: Vec<ClientRecord>,
}

/// `created_at` is kept as raw JSON so one odd value drops only its record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientRecord {
    #[serde(default)]
    pub created_at: Option<Value>,
}

impl TimestampedRecord for ClientRecord {
    fn created_at(&self) -> Option<NaiveDateTime> {
        match self.created_at.as_ref()? {
            Value::String(raw) => parse_timestamp(raw),
            Value::Number(millis) => millis.as_i64().and_then(parse_epoch_millis),
            _ => None,
        }
    }
}

/// Persisted slice of the UI state.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub sidebar_open: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodOption {
    pub token: PeriodToken,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RangeResponse {
    pub period: PeriodToken,
    pub range: DateRange,
    pub day_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesOutcome {
    pub period: PeriodToken,
    pub series: DailySeries,
    /// Set when the record source could not be read and the series is all zero.
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    #[serde(default)]
    pub level: Level,
    pub message: String,
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub id: u64,
}
