//! User-facing status line

use std::fmt;

use crate::domain::error::RecorderError;

/// What the status output currently reports
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    RequestingPermission,
    Recording,
    Stopping,
    /// Carries the human-readable artifact size
    Ready { size: String },
    Playing,
    Cleared,
    Failed(RecorderError),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&RecorderError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::RequestingPermission => write!(f, "requesting microphone permission…"),
            Self::Recording => write!(f, "recording… speak now"),
            Self::Stopping => write!(f, "stopping…"),
            Self::Ready { size } => write!(f, "recorded ({}), ready to play", size),
            Self::Playing => write!(f, "playing"),
            Self::Cleared => write!(f, "cleared (idle)"),
            Self::Failed(err) => write!(f, "{}", err),
        }
    }
}

impl From<RecorderError> for Status {
    fn from(err: RecorderError) -> Self {
        Self::Failed(err)
    }
}
