//! # ImageGen TUI
//!
//! A terminal front-end for hosted text-to-image models.
//!
//! ## Features
//! - Multi-line prompt editor
//! - One request per submission to the Hugging Face inference router
//! - Provider error messages surfaced verbatim
//! - Download of the generated image (never overwrites)
//! - Light/Dark/System themes
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod models;
pub mod error;
pub mod config;
pub mod storage;
pub mod ui;
pub mod messages;
pub mod app;
pub mod network;
pub mod constants;

// Re-export commonly used types
pub use models::{Credential, GenerationState, ImageFormat, ImageHandle, Prompt, Theme};
pub use error::GenerationError;
pub use config::Config;
pub use storage::Downloads;
pub use messages::{GenerateRequest, NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use app::{AppActor, AppState, Generator};
pub use network::{HuggingFaceClient, ImageProvider, NetworkActor};
