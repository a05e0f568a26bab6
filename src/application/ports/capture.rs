//! Capture device port
//!
//! A capture device grants a live microphone stream and, for that stream,
//! an encoder that emits encoded chunks. Results that arrive later (chunks,
//! finalization, failures) are pushed through [`EncoderEvents`].

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::audio::MimeType;
use crate::domain::error::RecorderError;
use crate::domain::recorder::SessionId;

/// Capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("No capture device available")]
    Unavailable,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Capture failed: {0}")]
    Failed(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

impl From<CaptureError> for RecorderError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::Unavailable => RecorderError::UnsupportedCapability,
            CaptureError::PermissionDenied(detail) => RecorderError::PermissionDenied(detail),
            other => RecorderError::CaptureError(other.to_string()),
        }
    }
}

/// What the stream request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub audio: bool,
}

impl StreamConstraints {
    pub const fn audio_only() -> Self {
        Self { audio: true }
    }
}

/// Events an active encoder reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    /// A piece of encoded audio, in capture order
    Chunk(Vec<u8>),
    /// The encoder has stopped; no further chunks follow
    Finalized,
    /// The device or encoder failed mid-session
    Failed(CaptureError),
}

/// Sending half given to an encoder, tagged with the session it serves.
///
/// All events of one encoder travel over the same ordered channel, so a
/// `Finalized` is always observed after every chunk sent before it.
#[derive(Debug, Clone)]
pub struct EncoderEvents {
    session: SessionId,
    tx: mpsc::UnboundedSender<(SessionId, EncoderEvent)>,
}

impl EncoderEvents {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<(SessionId, EncoderEvent)>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Report a chunk. Returns false once nobody is listening.
    pub fn chunk(&self, bytes: Vec<u8>) -> bool {
        self.send(EncoderEvent::Chunk(bytes))
    }

    pub fn finalized(&self) -> bool {
        self.send(EncoderEvent::Finalized)
    }

    pub fn failed(&self, err: CaptureError) -> bool {
        self.send(EncoderEvent::Failed(err))
    }

    fn send(&self, event: EncoderEvent) -> bool {
        self.tx.send((self.session, event)).is_ok()
    }
}

/// A granted microphone stream
pub trait StreamHandle: Send + 'static {
    /// Stop every track and give the device back.
    /// Must be safe to call more than once.
    fn release_all_tracks(&mut self);
}

/// An encoder attached to a stream
pub trait EncoderHandle: Send + 'static {
    /// The encoding this encoder actually produces
    fn mime_type(&self) -> &MimeType;

    fn start(&mut self) -> Result<(), CaptureError>;

    /// Request finalization. Completion is reported as
    /// [`EncoderEvent::Finalized`], after the last chunk.
    fn stop(&mut self) -> Result<(), CaptureError>;
}

/// Port for microphone capture
#[async_trait]
pub trait CaptureDevice: Send + Sync + 'static {
    type Stream: StreamHandle;
    type Encoder: EncoderHandle;

    /// Whether the host has any capture capability at all.
    /// Checked before any stream is requested.
    fn is_available(&self) -> bool;

    /// Ask for a live stream. May wait on the device or a permission prompt.
    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Self::Stream, CaptureError>;

    /// Create an encoder for `stream` using the first type in `preferred`
    /// the device supports, or its own default when none match.
    fn negotiate_encoder(
        &self,
        stream: &Self::Stream,
        preferred: &[MimeType],
        events: EncoderEvents,
    ) -> Result<Self::Encoder, CaptureError>;
}
