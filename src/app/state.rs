//! App state - pure data structure with no I/O logic

use crate::app::generator::Generator;
use crate::config::Config;
use crate::messages::render::Notice;
use crate::messages::ui_events::InputMode;
use crate::messages::RenderState;
use crate::models::{Credential, Theme};
use crate::storage::Downloads;

/// Main application state - pure data, no I/O
pub struct AppState {
    // Injected configuration
    pub credential: Option<Credential>,
    pub model: String,

    // Page shell
    pub theme: Theme,
    pub system_theme: Theme,

    // Prompt editor
    pub prompt: String,
    pub cursor_position: usize,
    pub input_mode: InputMode,

    // Generator flow
    pub generator: Generator,
    pub last_time_ms: Option<u64>,

    // Download target and last download result
    pub downloads: Downloads,
    pub notice: Option<Notice>,

    // Popups
    pub show_help: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            credential: config.credential.clone(),
            model: config.model.clone(),
            theme: config.theme,
            system_theme: config.system_theme,
            prompt: String::new(),
            cursor_position: 0,
            input_mode: InputMode::Normal,
            generator: Generator::new(),
            last_time_ms: None,
            downloads: Downloads::new(config.download_dir.clone()),
            notice: None,
            show_help: false,
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            theme: self.theme,
            system_theme: self.system_theme,
            model: self.model.clone(),
            credential_configured: self.credential.is_some(),
            prompt: self.prompt.clone(),
            cursor_position: self.cursor_position,
            input_mode: self.input_mode,
            view: self.generator.view(),
            last_time_ms: self.last_time_ms,
            notice: self.notice.clone(),
            show_help: self.show_help,
        }
    }
}
