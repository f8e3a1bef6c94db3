//! Render state - data structure sent from App layer to UI for rendering

use crate::constants::DEFAULT_MODEL;
use crate::messages::ui_events::InputMode;
use crate::models::{ImageFormat, ImageHandle, Theme};

/// What the image area shows; mirrors `GenerationState` without the bytes
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GenerationView {
    #[default]
    Idle,
    Loading {
        bytes_received: usize,
    },
    Succeeded {
        format: ImageFormat,
        size: usize,
        content_type: Option<String>,
        prompt: String,
        created_at: chrono::DateTime<chrono::Utc>,
    },
    Failed {
        message: String,
    },
}

impl GenerationView {
    pub fn from_image(image: &ImageHandle) -> Self {
        GenerationView::Succeeded {
            format: image.format(),
            size: image.len(),
            content_type: image.content_type().map(str::to_string),
            prompt: image.prompt().to_string(),
            created_at: image.created_at(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, GenerationView::Loading { .. })
    }

    pub fn has_image(&self) -> bool {
        matches!(self, GenerationView::Succeeded { .. })
    }
}

/// One-line status message (download results)
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Page shell
    pub theme: Theme,
    pub system_theme: Theme,
    pub model: String,
    pub credential_configured: bool,

    // Prompt editor
    pub prompt: String,
    pub cursor_position: usize,
    pub input_mode: InputMode,

    // Generator
    pub view: GenerationView,
    pub last_time_ms: Option<u64>,
    pub notice: Option<Notice>,

    // Popups
    pub show_help: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            theme: Theme::default(),
            system_theme: Theme::Dark,
            model: String::from(DEFAULT_MODEL),
            credential_configured: false,
            prompt: String::new(),
            cursor_position: 0,
            input_mode: InputMode::Normal,
            view: GenerationView::Idle,
            last_time_ms: None,
            notice: None,
            show_help: false,
        }
    }
}
