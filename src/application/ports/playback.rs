//! Playback sink port

use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioArtifact;
use crate::domain::error::RecorderError;

/// Errors that can occur when starting playback
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The host refused to start playback
    #[error("{0}")]
    Blocked(String),

    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("Cannot decode audio: {0}")]
    Decode(String),

    #[error("Playback reference was revoked")]
    Revoked,
}

impl From<PlaybackError> for RecorderError {
    fn from(err: PlaybackError) -> Self {
        RecorderError::PlaybackBlocked(err.to_string())
    }
}

/// Port for rendering a finished recording.
///
/// The recorder never hands bytes to the user surface directly; it attaches
/// the artifact here and addresses it through the returned reference.
#[async_trait]
pub trait PlaybackSink: Send + Sync + 'static {
    /// Opaque, revocable handle to an attached artifact
    type Reference: Clone + Debug + PartialEq + Send + Sync + 'static;

    fn attach(&self, artifact: &AudioArtifact) -> Self::Reference;

    /// Release the artifact behind `reference`. Unknown references are ignored.
    fn revoke(&self, reference: &Self::Reference);

    /// Start playback. Resolves once playback has started (or was refused),
    /// not when it ends.
    async fn play(&self, reference: &Self::Reference) -> Result<(), PlaybackError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_detail_is_not_double_prefixed() {
        let err = RecorderError::from(PlaybackError::Blocked("output busy".into()));
        assert_eq!(err.to_string(), "playback blocked: output busy");
    }

    #[test]
    fn other_playback_errors_keep_their_message() {
        let err = RecorderError::from(PlaybackError::Revoked);
        assert_eq!(
            err,
            RecorderError::PlaybackBlocked("Playback reference was revoked".into())
        );
    }
}
