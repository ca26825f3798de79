//! Dashboard chrome state: theme, sidebar, open modal.
//!
//! The page renders from [`UiState`]; every change goes through a
//! [`UiPipeline`] so extra behavior is added as middleware instead of
//! wrapping existing handlers.

use crate::models::Preferences;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiState {
    pub theme: Theme,
    pub sidebar_open: bool,
    pub open_modal: Option<String>,
    pub scroll_locked: bool,
}

impl UiState {
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            theme: prefs.theme,
            sidebar_open: prefs.sidebar_open,
            ..Self::default()
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            theme: self.theme,
            sidebar_open: self.sidebar_open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiAction {
    SetTheme { theme: Theme },
    ToggleTheme,
    ToggleSidebar,
    CloseSidebar,
    OpenModal { id: String, viewport_width: u32 },
    CloseModal,
}

/// Hook run after the core reducer, in registration order.
pub trait UiMiddleware: Send + Sync {
    fn after(&self, action: &UiAction, state: &mut UiState);
}

/// On narrow viewports an open modal hides the sidebar and freezes
/// page scroll behind it.
#[derive(Debug, Clone, Copy)]
pub struct MobileModalPatch {
    pub breakpoint: u32,
}

impl UiMiddleware for MobileModalPatch {
    fn after(&self, action: &UiAction, state: &mut UiState) {
        match action {
            UiAction::OpenModal { viewport_width, .. } if *viewport_width < self.breakpoint => {
                state.sidebar_open = false;
                state.scroll_locked = true;
            }
            UiAction::CloseModal => state.scroll_locked = false,
            _ => {}
        }
    }
}

#[derive(Default)]
pub struct UiPipeline {
    middleware: Vec<Box<dyn UiMiddleware>>,
}

impl UiPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, middleware: impl UiMiddleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn apply(&self, state: &mut UiState, action: &UiAction) {
        debug!(?action, "applying ui action");
        reduce(state, action);
        for hook in &self.middleware {
            hook.after(action, state);
        }
    }
}

fn reduce(state: &mut UiState, action: &UiAction) {
    match action {
        UiAction::SetTheme { theme } => state.theme = *theme,
        UiAction::ToggleTheme => state.theme = state.theme.toggled(),
        UiAction::ToggleSidebar => state.sidebar_open = !state.sidebar_open,
        UiAction::CloseSidebar => state.sidebar_open = false,
        UiAction::OpenModal { id, .. } => state.open_modal = Some(id.clone()),
        UiAction::CloseModal => state.open_modal = None,
    }
}
