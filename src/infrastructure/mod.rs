//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the host audio stack (cpal, rodio) and the filesystem.

pub mod capture;
pub mod config;
pub mod playback;

// Re-export adapters
pub use capture::CpalCaptureDevice;
pub use config::XdgConfigStore;
pub use playback::RodioPlaybackSink;
