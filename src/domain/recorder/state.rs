//! Recorder lifecycle states and the action guards derived from them

use std::fmt;
use thiserror::Error;

/// Recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    /// Waiting for the capture device to grant a stream
    Requesting,
    Recording,
    /// Encoder asked to stop; waiting for its final chunk
    Finalizing,
    /// A finished recording is available
    Ready,
}

impl RecorderState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Recording => "recording",
            Self::Finalizing => "finalizing",
            Self::Ready => "ready",
        }
    }

    /// Whether a capture stream may be held in this state
    pub const fn holds_capture(&self) -> bool {
        matches!(self, Self::Recording | Self::Finalizing)
    }

    /// Whether `action` is valid in this state
    pub const fn allows(&self, action: Action) -> bool {
        match action {
            Action::Record => matches!(self, Self::Idle | Self::Ready),
            Action::Stop => matches!(self, Self::Recording),
            Action::Play => matches!(self, Self::Ready),
            Action::Clear => matches!(self, Self::Idle | Self::Ready),
        }
    }

    /// Enabled flags for the user surface
    pub const fn availability(&self) -> Availability {
        Availability {
            record: self.allows(Action::Record),
            stop: self.allows(Action::Stop),
            play: self.allows(Action::Play),
            // clearing an idle recorder does nothing, so it is not offered
            clear: matches!(self, Self::Ready),
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four user-triggered actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Record,
    Stop,
    Play,
    Clear,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Stop => "stop",
            Self::Play => "play",
            Self::Clear => "clear",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which actions the user surface should currently offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Availability {
    pub record: bool,
    pub stop: bool,
    pub play: bool,
    pub clear: bool,
}

/// An action was invoked in a state that does not allow it.
///
/// Nothing changed: the recorder treats this as a no-op and hands the value
/// back so the caller can show a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {state}")]
pub struct ActionRejected {
    pub action: Action,
    pub state: RecorderState,
}
