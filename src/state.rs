use crate::config::Config;
use crate::models::Preferences;
use crate::notifications::{self, NotificationQueue};
use crate::source::ClientSource;
use crate::ui_state::{MobileModalPatch, UiPipeline, UiState};
use chrono::Duration;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub source: ClientSource,
    pub toast_ttl: Duration,
    pub ui: Arc<Mutex<UiState>>,
    pub pipeline: Arc<UiPipeline>,
    pub notifications: Arc<Mutex<NotificationQueue>>,
}

impl AppState {
    pub fn new(config: &Config, prefs: Preferences) -> Self {
        let pipeline = UiPipeline::new().with(MobileModalPatch {
            breakpoint: config.mobile_breakpoint,
        });

        Self {
            data_path: config.data_path.clone(),
            source: ClientSource::new(config.clients_url.clone()),
            toast_ttl: notifications::ttl(config.toast_ttl_secs),
            ui: Arc::new(Mutex::new(UiState::from_preferences(&prefs))),
            pipeline: Arc::new(pipeline),
            notifications: Arc::new(Mutex::new(NotificationQueue::default())),
        }
    }
}
