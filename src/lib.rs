//! voice-memo - a minimal voice recorder
//!
//! Records from the microphone into memory, plays the result back, and
//! clears it. One recording at a time; nothing is saved to disk.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recorder state machine, value objects, and errors
//! - **Application**: The recording controller and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal capture, rodio playback, XDG config)
//! - **CLI**: Argument parsing, interactive commands, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
