//! Network layer - provider request execution
//!
//! The Network actor receives generation commands and sends back progress
//! and settlements.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::{HuggingFaceClient, ImageProvider, ProgressSink};
