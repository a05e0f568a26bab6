//! CLI layer - Command-line interface
//!
//! Contains argument parsing, the interactive command parser, output
//! formatting, signal handling, and the session runner.

pub mod app;
pub mod args;
pub mod command;
pub mod config_cmd;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{run_session, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, SessionOptions};
pub use presenter::Presenter;
