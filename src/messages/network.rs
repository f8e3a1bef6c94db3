//! Network messages - communication between App and Network layers

use crate::error::GenerationError;
use crate::models::{Credential, ImageHandle, Prompt};

/// Everything the provider needs for one generation
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub id: u64,
    pub prompt: Prompt,
    pub credential: Credential,
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Run one text-to-image request
    Generate(GenerateRequest),

    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// Image body is arriving
    Progress {
        id: u64,
        bytes_received: usize,
    },
    /// Request finished, one way or the other
    Settled {
        id: u64,
        result: Result<ImageHandle, GenerationError>,
        time_ms: u64,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Progress { id, .. } => *id,
            NetworkResponse::Settled { id, .. } => *id,
        }
    }

    /// Check if this is a terminal response (no more messages expected for this id)
    pub fn is_terminal(&self) -> bool {
        matches!(self, NetworkResponse::Settled { .. })
    }
}
