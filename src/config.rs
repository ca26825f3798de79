use std::{env, path::PathBuf, str::FromStr};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";
pub const DEFAULT_CLIENTS_URL: &str = "http://127.0.0.1/api-clients.php";
pub const DEFAULT_TOAST_TTL_SECS: u64 = 5;
pub const DEFAULT_MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub clients_url: String,
    pub toast_ttl_secs: u64,
    pub mobile_breakpoint: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            clients_url: DEFAULT_CLIENTS_URL.to_string(),
            toast_ttl_secs: DEFAULT_TOAST_TTL_SECS,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            clients_url: lookup("CLIENTS_API_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.clients_url),
            toast_ttl_secs: parsed(&lookup, "TOAST_TTL_SECS").unwrap_or(defaults.toast_ttl_secs),
            mobile_breakpoint: parsed(&lookup, "MOBILE_BREAKPOINT")
                .unwrap_or(defaults.mobile_breakpoint),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}
