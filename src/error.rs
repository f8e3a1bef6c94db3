//! Generation errors - every way a single submission can end badly

use thiserror::Error;

/// Terminal failure of one submission. The `Display` text is shown to the
/// user verbatim in the error banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("empty prompt: describe the image you want to generate")]
    EmptyPrompt,

    #[error("missing credential: set HF_TOKEN in the environment or a .env file")]
    MissingCredential,

    /// Non-2xx answer from the provider
    #[error("{message}")]
    ProviderHttp { status: u16, message: String },

    #[error("{0}")]
    Unknown(String),
}

impl GenerationError {
    /// HTTP status of a provider failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::ProviderHttp { status, .. } => Some(*status),
            _ => None,
        }
    }
}
