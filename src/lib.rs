pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod period;
pub mod series;
pub mod source;
pub mod state;
pub mod storage;
pub mod ui;
pub mod ui_state;

pub use app::router;
pub use config::Config;
pub use period::{DateRange, PeriodToken, TrailingDays, resolve};
pub use series::{DailySeries, TimestampedRecord, bucketize};
pub use state::AppState;
pub use storage::load_preferences;
