//! Application layer - Use cases and port interfaces
//!
//! Contains the recorder lifecycle use case and the trait definitions
//! for the capture and playback capabilities it drives.

pub mod controller;
pub mod ports;

// Re-export use cases
pub use controller::{ControllerEvent, RecordingController};
