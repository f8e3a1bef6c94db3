//! Generator flow - the idle/loading/succeeded/failed state machine
//!
//! Pure data: deciding whether a submission goes out, and folding the
//! provider's answer back into state. No I/O happens here.

use crate::error::GenerationError;
use crate::messages::{GenerateRequest, GenerationView};
use crate::models::{Credential, GenerationState, ImageHandle, Prompt};

pub struct Generator {
    state: GenerationState,
    next_request_id: u64,
    pending_request_id: Option<u64>,
    bytes_received: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Generator {
            state: GenerationState::Idle,
            next_request_id: 1,
            pending_request_id: None,
            bytes_received: 0,
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn pending_request_id(&self) -> Option<u64> {
        self.pending_request_id
    }

    /// Generate a unique request ID
    fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Validate and start a submission.
    ///
    /// Returns the request to dispatch when the generator moved to `Loading`.
    /// Returns `None` when a precondition failed (state is now `Failed`) or a
    /// request is already in flight (state unchanged).
    pub fn submit(&mut self, text: &str, credential: Option<&Credential>) -> Option<GenerateRequest> {
        if self.is_loading() {
            tracing::warn!(pending = ?self.pending_request_id, "Submission rejected: request in flight");
            return None;
        }

        let prompt = match Prompt::parse(text) {
            Ok(prompt) => prompt,
            Err(e) => {
                self.fail(e);
                return None;
            }
        };

        let Some(credential) = credential.cloned() else {
            self.fail(GenerationError::MissingCredential);
            return None;
        };

        let id = self.next_id();
        self.pending_request_id = Some(id);
        self.bytes_received = 0;
        self.state = GenerationState::Loading;

        Some(GenerateRequest { id, prompt, credential })
    }

    /// Record body progress for the pending request
    pub fn progress(&mut self, id: u64, bytes_received: usize) {
        if self.pending_request_id == Some(id) {
            self.bytes_received = bytes_received;
        }
    }

    /// Fold the provider's answer into state. Returns false for a stale id.
    pub fn settle(&mut self, id: u64, result: Result<ImageHandle, GenerationError>) -> bool {
        if self.pending_request_id != Some(id) {
            tracing::debug!(id, "Ignoring settlement for stale request");
            return false;
        }

        self.pending_request_id = None;
        self.bytes_received = 0;
        match result {
            Ok(image) => self.state = GenerationState::Succeeded(image),
            Err(e) => self.fail(e),
        }
        true
    }

    /// Image available for save-as, only in `Succeeded`
    pub fn download_target(&self) -> Option<&ImageHandle> {
        self.state.image()
    }

    pub fn view(&self) -> GenerationView {
        match &self.state {
            GenerationState::Idle => GenerationView::Idle,
            GenerationState::Loading => GenerationView::Loading {
                bytes_received: self.bytes_received,
            },
            GenerationState::Succeeded(image) => GenerationView::from_image(image),
            GenerationState::Failed(message) => GenerationView::Failed {
                message: message.clone(),
            },
        }
    }

    fn fail(&mut self, error: GenerationError) {
        tracing::error!(error = %error, status = ?error.status(), "Generation failed");
        self.state = GenerationState::Failed(error.to_string());
    }
}
