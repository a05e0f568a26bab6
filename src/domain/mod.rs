//! Domain layer - Core business logic
//!
//! Contains the recorder state machine, value objects, and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod error;
pub mod recorder;
pub mod recording;

// Re-export common types
pub use audio::{AudioArtifact, MimeType};
pub use config::AppConfig;
pub use error::*;
pub use recorder::{Action, ActionRejected, Availability, RecorderState, Session, SessionId, Status};
pub use recording::Duration;
