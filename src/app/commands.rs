//! Command handlers - business logic for processing UI events

use crate::app::AppState;
use crate::messages::render::Notice;
use crate::messages::ui_events::InputMode;
use crate::messages::{NetworkCommand, NetworkResponse};

impl AppState {
    // ========================
    // Prompt editing
    // ========================

    /// The editor is read-only while a request is in flight
    pub fn start_editing(&mut self) {
        if self.generator.is_loading() {
            return;
        }
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.prompt.len();
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            let new_pos = self.prompt[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.prompt.len() {
            let new_pos = self.prompt[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(self.prompt.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        if self.generator.is_loading() {
            return;
        }
        if self.cursor_position <= self.prompt.len() {
            self.prompt.insert(self.cursor_position, c);
            self.cursor_position += c.len_utf8();
        }
    }

    pub fn delete_char(&mut self) {
        if self.generator.is_loading() {
            return;
        }
        if self.cursor_position > 0 {
            let prev_pos = self.prompt[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.prompt.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    // ========================
    // Generation
    // ========================

    pub fn submit(&mut self) -> Option<NetworkCommand> {
        if self.input_mode == InputMode::Editing {
            self.stop_editing();
        }

        let request = self.generator.submit(&self.prompt, self.credential.as_ref())?;
        self.notice = None;
        self.last_time_ms = None;
        tracing::info!(id = request.id, model = %self.model, "Submitting prompt");
        Some(NetworkCommand::Generate(request))
    }

    pub fn handle_response(&mut self, response: NetworkResponse) {
        let id = response.id();
        match response {
            NetworkResponse::Progress { bytes_received, .. } => {
                self.generator.progress(id, bytes_received);
            }
            NetworkResponse::Settled { result, time_ms, .. } => {
                if self.generator.settle(id, result) {
                    tracing::info!(id, time_ms, "Request settled");
                    self.last_time_ms = Some(time_ms);
                } else {
                    tracing::debug!(id, "Ignoring stale settlement");
                }
            }
        }
    }

    // ========================
    // Download
    // ========================

    /// Save the current image; does nothing unless an image is held
    pub fn download(&mut self) {
        let Some(image) = self.generator.download_target() else {
            return;
        };

        self.notice = Some(match self.downloads.save(image) {
            Ok(path) => {
                tracing::info!(path = %path.display(), bytes = image.len(), "Image saved");
                Notice {
                    text: format!("Saved to {}", path.display()),
                    is_error: false,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Saving image failed");
                Notice {
                    text: format!("Download failed: {:#}", e),
                    is_error: true,
                }
            }
        });
    }

    // ========================
    // Page shell
    // ========================

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.next();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FileConfig};
    use crate::error::GenerationError;
    use crate::messages::GenerationView;
    use crate::models::{ImageHandle, Theme};
    use std::collections::HashMap;
    use std::path::Path;
    use tempfile::tempdir;

    fn state(download_dir: &Path, token: Option<&str>) -> AppState {
        let mut env = HashMap::new();
        env.insert(
            "IMAGEGEN_DOWNLOAD_DIR".to_string(),
            download_dir.to_string_lossy().to_string(),
        );
        if let Some(token) = token {
            env.insert("HF_TOKEN".to_string(), token.to_string());
        }
        AppState::new(&Config::resolve(FileConfig::default(), &env, download_dir.to_path_buf()))
    }

    fn type_text(state: &mut AppState, text: &str) {
        state.start_editing();
        for c in text.chars() {
            state.enter_char(c);
        }
    }

    fn png() -> ImageHandle {
        ImageHandle::new(
            vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 7],
            Some("image/png".into()),
            "a red fox",
        )
        .unwrap()
    }

    #[test]
    fn test_editing_with_multibyte_chars() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), Some("hf_x"));
        type_text(&mut state, "güneş");
        state.move_cursor_left();
        state.delete_char();
        assert_eq!(state.prompt, "günş");
        state.move_cursor_right();
        assert_eq!(state.cursor_position, state.prompt.len());
    }

    #[test]
    fn test_empty_prompt_sends_nothing() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), Some("hf_x"));
        type_text(&mut state, "   ");
        assert!(state.submit().is_none());
        assert!(matches!(state.to_render_state().view, GenerationView::Failed { .. }));
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_missing_credential_sends_nothing() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), None);
        type_text(&mut state, "a red fox");
        assert!(state.submit().is_none());
        assert!(!state.to_render_state().credential_configured);
        assert!(state.generator.state().error().is_some());
    }

    #[test]
    fn test_editor_is_locked_while_loading() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), Some("hf_x"));
        type_text(&mut state, "fox");
        assert!(matches!(state.submit(), Some(NetworkCommand::Generate(_))));

        state.start_editing();
        assert_eq!(state.input_mode, InputMode::Normal);
        state.enter_char('!');
        state.delete_char();
        assert_eq!(state.prompt, "fox");
        assert!(state.submit().is_none());
    }

    #[test]
    fn test_settlement_updates_view() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), Some("hf_x"));
        type_text(&mut state, "a red fox");
        let Some(NetworkCommand::Generate(request)) = state.submit() else {
            panic!("expected a generate command");
        };

        state.handle_response(NetworkResponse::Progress { id: request.id, bytes_received: 4 });
        assert_eq!(state.to_render_state().view, GenerationView::Loading { bytes_received: 4 });

        state.handle_response(NetworkResponse::Settled {
            id: request.id,
            result: Err(GenerationError::ProviderHttp { status: 500, message: "HTTP error 500".into() }),
            time_ms: 12,
        });
        let render = state.to_render_state();
        assert_eq!(render.view, GenerationView::Failed { message: "HTTP error 500".into() });
        assert_eq!(render.last_time_ms, Some(12));
    }

    #[test]
    fn test_download_without_image_is_noop() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), Some("hf_x"));
        state.download();
        assert!(state.notice.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_download_after_failure_is_noop() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), Some("hf_x"));
        assert!(state.submit().is_none());
        assert!(state.generator.state().error().is_some());

        state.download();
        assert!(state.notice.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_download_while_loading_is_noop() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), Some("hf_x"));
        type_text(&mut state, "a red fox");
        assert!(state.submit().is_some());
        assert!(state.generator.is_loading());

        state.download();
        assert!(state.notice.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_download_saves_image() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), Some("hf_x"));
        type_text(&mut state, "a red fox");
        let Some(NetworkCommand::Generate(request)) = state.submit() else {
            panic!("expected a generate command");
        };
        state.handle_response(NetworkResponse::Settled { id: request.id, result: Ok(png()), time_ms: 5 });

        state.download();
        let notice = state.notice.clone().unwrap();
        assert!(!notice.is_error);
        assert!(dir.path().join("generated_image.png").exists());
    }

    #[test]
    fn test_theme_toggle_cycles() {
        let dir = tempdir().unwrap();
        let mut state = state(dir.path(), None);
        assert_eq!(state.theme, Theme::System);
        state.toggle_theme();
        assert_eq!(state.to_render_state().theme, Theme::Light);
    }
}
