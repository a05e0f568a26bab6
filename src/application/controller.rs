//! Recording controller use case
//!
//! Owns the recorder lifecycle and everything tied to it: the capture stream
//! and encoder, the current session's chunks and artifact, and the playback
//! reference.
//!
//! State machine:
//!   IDLE | READY -> REQUESTING (record)
//!   REQUESTING -> RECORDING (stream granted, encoder started)
//!   REQUESTING -> IDLE (denied / failed)
//!   RECORDING -> FINALIZING (stop)
//!   RECORDING | FINALIZING -> READY (encoder finalized)
//!   RECORDING | FINALIZING -> IDLE (capture failure)
//!   READY -> IDLE (clear)
//!
//! Capability results never touch the controller directly. They are queued as
//! [`ControllerEvent`]s and applied one at a time by [`RecordingController::handle_event`],
//! so the controller needs no locking.

use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::domain::audio::{default_preferred_types, AudioArtifact, MimeType};
use crate::domain::error::RecorderError;
use crate::domain::recorder::{
    Action, ActionRejected, Availability, RecorderState, Session, SessionId, Status,
};

use super::ports::{
    CaptureDevice, CaptureError, EncoderEvent, EncoderEvents, EncoderHandle, PlaybackError,
    PlaybackSink, StreamConstraints, StreamHandle,
};

/// A capability result waiting to be applied
pub enum ControllerEvent<S> {
    /// The stream request issued by `record` has completed
    StreamResult {
        session: SessionId,
        result: Result<S, CaptureError>,
    },
    Encoder {
        session: SessionId,
        event: EncoderEvent,
    },
    /// A playback attempt issued by `play` has started or been refused
    PlaybackResult {
        session: SessionId,
        result: Result<(), PlaybackError>,
    },
}

struct ActiveCapture<S, E> {
    stream: S,
    encoder: E,
    started_at: Instant,
}

/// Recording controller
pub struct RecordingController<D, P>
where
    D: CaptureDevice,
    P: PlaybackSink,
{
    device: Arc<D>,
    sink: Arc<P>,
    preferred_types: Vec<MimeType>,
    state: RecorderState,
    status: Status,
    session: Session,
    capture: Option<ActiveCapture<D::Stream, D::Encoder>>,
    playback: Option<P::Reference>,
    task_tx: mpsc::UnboundedSender<ControllerEvent<D::Stream>>,
    task_rx: mpsc::UnboundedReceiver<ControllerEvent<D::Stream>>,
    encoder_tx: mpsc::UnboundedSender<(SessionId, EncoderEvent)>,
    encoder_rx: mpsc::UnboundedReceiver<(SessionId, EncoderEvent)>,
}

impl<D, P> RecordingController<D, P>
where
    D: CaptureDevice,
    P: PlaybackSink,
{
    /// Create an idle controller using the built-in encoding priority list
    pub fn new(device: D, sink: P) -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (encoder_tx, encoder_rx) = mpsc::unbounded_channel();
        Self {
            device: Arc::new(device),
            sink: Arc::new(sink),
            preferred_types: default_preferred_types(),
            state: RecorderState::Idle,
            status: Status::Idle,
            session: Session::default(),
            capture: None,
            playback: None,
            task_tx,
            task_rx,
            encoder_tx,
            encoder_rx,
        }
    }

    /// Replace the encoding priority list
    pub fn with_preferred_types(mut self, preferred_types: Vec<MimeType>) -> Self {
        self.preferred_types = preferred_types;
        self
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn availability(&self) -> Availability {
        self.state.availability()
    }

    pub fn session_id(&self) -> SessionId {
        self.session.id()
    }

    /// Chunks captured so far in the current session
    pub fn chunk_count(&self) -> usize {
        self.session.chunk_count()
    }

    /// The finished recording, present only when `Ready`
    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.session.artifact()
    }

    pub fn playback_reference(&self) -> Option<&P::Reference> {
        self.playback.as_ref()
    }

    /// Time since the encoder started, while a stream is held
    pub fn elapsed(&self) -> Option<StdDuration> {
        self.capture.as_ref().map(|c| c.started_at.elapsed())
    }

    /// Start a new recording.
    ///
    /// Discards any previous recording, then requests a stream in the
    /// background; the grant or denial arrives as a [`ControllerEvent`].
    /// Must be called from within a Tokio runtime.
    pub fn record(&mut self) -> Result<(), ActionRejected> {
        self.guard(Action::Record)?;

        if !self.device.is_available() {
            warn!("Capture device unavailable, not recording");
            self.status = Status::Failed(RecorderError::UnsupportedCapability);
            return Ok(());
        }

        self.revoke_playback();
        let session = self.session.id().next();
        self.session = Session::new(session);
        self.transition(RecorderState::Requesting, Status::RequestingPermission);

        let device = Arc::clone(&self.device);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = device.request_stream(StreamConstraints::audio_only()).await;
            let _ = tx.send(ControllerEvent::StreamResult { session, result });
        });

        Ok(())
    }

    /// Ask the encoder to finish. Does nothing unless recording.
    pub fn stop(&mut self) -> Result<(), ActionRejected> {
        if !self.state.allows(Action::Stop) {
            debug!("stop ignored while {}", self.state);
            return Ok(());
        }

        self.transition(RecorderState::Finalizing, Status::Stopping);

        let stopped = match self.capture.as_mut() {
            Some(capture) => capture.encoder.stop(),
            None => Err(CaptureError::Failed("no active capture".into())),
        };
        if let Err(err) = stopped {
            self.fail(err.into());
        }

        Ok(())
    }

    /// Play the finished recording in the background
    pub fn play(&mut self) -> Result<(), ActionRejected> {
        self.guard(Action::Play)?;
        let Some(reference) = self.playback.clone() else {
            return Err(self.reject(Action::Play));
        };

        let sink = Arc::clone(&self.sink);
        let tx = self.task_tx.clone();
        let session = self.session.id();
        tokio::spawn(async move {
            let result = sink.play(&reference).await;
            let _ = tx.send(ControllerEvent::PlaybackResult { session, result });
        });

        Ok(())
    }

    /// Drop the finished recording and return to idle
    pub fn clear(&mut self) -> Result<(), ActionRejected> {
        match self.state {
            RecorderState::Idle => Ok(()),
            RecorderState::Ready => {
                self.revoke_playback();
                self.session.discard();
                self.transition(RecorderState::Idle, Status::Cleared);
                Ok(())
            }
            _ => Err(self.reject(Action::Clear)),
        }
    }

    /// Tear down from any state: release the stream, revoke playback, go idle
    pub fn shutdown(&mut self) {
        self.release_capture();
        self.revoke_playback();
        self.session.discard();
        self.transition(RecorderState::Idle, Status::Idle);
    }

    /// Wait for the next queued capability result
    pub async fn next_event(&mut self) -> Option<ControllerEvent<D::Stream>> {
        tokio::select! {
            Some(event) = self.task_rx.recv() => Some(event),
            Some((session, event)) = self.encoder_rx.recv() => {
                Some(ControllerEvent::Encoder { session, event })
            }
            else => None,
        }
    }

    /// Wait for one event and apply it
    pub async fn pump(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply every event already queued without waiting; returns how many
    pub fn pump_pending(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let event = if let Ok((session, event)) = self.encoder_rx.try_recv() {
                ControllerEvent::Encoder { session, event }
            } else if let Ok(event) = self.task_rx.try_recv() {
                event
            } else {
                break;
            };
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Apply one capability result as an atomic transition
    pub fn handle_event(&mut self, event: ControllerEvent<D::Stream>) {
        match event {
            ControllerEvent::StreamResult { session, result } => {
                self.on_stream_result(session, result)
            }
            ControllerEvent::Encoder { session, event } => self.on_encoder_event(session, event),
            ControllerEvent::PlaybackResult { session, result } => {
                self.on_playback_result(session, result)
            }
        }
    }

    fn on_stream_result(&mut self, session: SessionId, result: Result<D::Stream, CaptureError>) {
        if session != self.session.id() || self.state != RecorderState::Requesting {
            debug!("discarding stream result for superseded session {}", session);
            if let Ok(mut stream) = result {
                stream.release_all_tracks();
            }
            return;
        }

        match result {
            Ok(stream) => self.start_capture(stream),
            Err(err) => self.fail(err.into()),
        }
    }

    fn start_capture(&mut self, mut stream: D::Stream) {
        let events = EncoderEvents::new(self.session.id(), self.encoder_tx.clone());
        let started = self
            .device
            .negotiate_encoder(&stream, &self.preferred_types, events)
            .and_then(|mut encoder| encoder.start().map(|()| encoder));

        match started {
            Ok(encoder) => {
                info!(
                    "Recording session {} as {}",
                    self.session.id(),
                    encoder.mime_type()
                );
                self.capture = Some(ActiveCapture {
                    stream,
                    encoder,
                    started_at: Instant::now(),
                });
                self.transition(RecorderState::Recording, Status::Recording);
            }
            Err(err) => {
                stream.release_all_tracks();
                self.fail(err.into());
            }
        }
    }

    fn on_encoder_event(&mut self, session: SessionId, event: EncoderEvent) {
        if session != self.session.id() || !self.state.holds_capture() {
            debug!("dropping encoder event for inactive session {}", session);
            return;
        }

        match event {
            EncoderEvent::Chunk(bytes) => {
                if !self.session.push_chunk(bytes) {
                    debug!("dropped empty chunk");
                }
            }
            EncoderEvent::Finalized => self.finish_recording(),
            EncoderEvent::Failed(err) => self.fail(err.into()),
        }
    }

    fn finish_recording(&mut self) {
        let Some(mut capture) = self.capture.take() else {
            self.fail(RecorderError::CaptureError("no active capture".into()));
            return;
        };
        capture.stream.release_all_tracks();
        let mime_type = capture.encoder.mime_type().clone();
        drop(capture);

        self.revoke_playback();
        let artifact = self.session.finalize(mime_type);
        let size = artifact.human_readable_size();
        self.playback = Some(self.sink.attach(artifact));

        info!("Session {} ready ({})", self.session.id(), size);
        self.transition(RecorderState::Ready, Status::Ready { size });
    }

    fn on_playback_result(&mut self, session: SessionId, result: Result<(), PlaybackError>) {
        if session != self.session.id() || self.state != RecorderState::Ready {
            debug!("ignoring playback result for session {}", session);
            return;
        }

        self.status = match result {
            Ok(()) => Status::Playing,
            Err(err) => {
                error!("Playback refused: {}", err);
                Status::Failed(err.into())
            }
        };
    }

    /// Reset to idle after a capture failure, discarding captured chunks
    fn fail(&mut self, err: RecorderError) {
        error!("Recording failed: {}", err);
        self.release_capture();
        self.session.discard();
        self.transition(RecorderState::Idle, Status::Failed(err));
    }

    fn release_capture(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            capture.stream.release_all_tracks();
        }
    }

    fn revoke_playback(&mut self) {
        if let Some(reference) = self.playback.take() {
            self.sink.revoke(&reference);
        }
    }

    fn transition(&mut self, state: RecorderState, status: Status) {
        if self.state != state {
            debug!("{} -> {}", self.state, state);
        }
        self.state = state;
        self.status = status;
    }

    fn guard(&self, action: Action) -> Result<(), ActionRejected> {
        if self.state.allows(action) {
            Ok(())
        } else {
            Err(self.reject(action))
        }
    }

    fn reject(&self, action: Action) -> ActionRejected {
        let rejected = ActionRejected {
            action,
            state: self.state,
        };
        warn!("{}", rejected);
        rejected
    }
}

impl<D, P> Drop for RecordingController<D, P>
where
    D: CaptureDevice,
    P: PlaybackSink,
{
    fn drop(&mut self) {
        self.release_capture();
        self.revoke_playback();
    }
}
