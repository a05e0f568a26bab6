//! Rodio-based playback sink
//!
//! Attached artifacts are kept in memory under numeric references. Playback
//! runs on its own thread because `rodio::OutputStream` is not `Send`; that
//! thread polls a stop flag so revoking a reference silences it.

use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use log::debug;
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;

use crate::application::ports::{PlaybackError, PlaybackSink};
use crate::domain::audio::AudioArtifact;

/// Handle to an artifact attached to a [`RodioPlaybackSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackRef(u64);

impl fmt::Display for PlaybackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memo:{}", self.0)
    }
}

/// Shared artifact bytes, readable through a `Cursor`
struct ArtifactBytes(Arc<AudioArtifact>);

impl AsRef<[u8]> for ArtifactBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.data()
    }
}

/// How often a playing thread checks whether it was stopped
const STOP_POLL: StdDuration = StdDuration::from_millis(50);

/// Stop flag shared with one playback thread
type StopFlag = Arc<AtomicBool>;

struct Attached {
    artifact: Arc<AudioArtifact>,
    /// Flag of the most recent playback of this artifact
    playing: Option<StopFlag>,
}

impl Attached {
    fn stop_playing(&mut self) {
        if let Some(flag) = self.playing.take() {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

/// Plays recordings on the default output device
#[derive(Default)]
pub struct RodioPlaybackSink {
    next_id: AtomicU64,
    attached: StdMutex<HashMap<PlaybackRef, Attached>>,
}

impl RodioPlaybackSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifacts currently attached
    pub fn attached_count(&self) -> usize {
        self.attached.lock().map(|map| map.len()).unwrap_or(0)
    }

    fn lookup(&self, reference: &PlaybackRef) -> Option<Arc<AudioArtifact>> {
        self.attached
            .lock()
            .ok()
            .and_then(|map| map.get(reference).map(|a| Arc::clone(&a.artifact)))
    }

    /// Stop any earlier playback of `reference` and register a new one
    fn begin_playback(&self, reference: &PlaybackRef) -> Option<(Arc<AudioArtifact>, StopFlag)> {
        let mut map = self.attached.lock().ok()?;
        let attached = map.get_mut(reference)?;
        attached.stop_playing();
        let stop = StopFlag::default();
        attached.playing = Some(Arc::clone(&stop));
        Some((Arc::clone(&attached.artifact), stop))
    }
}

/// Open the output, queue the artifact, report the start, then block
/// until playback ends or `stop` is set.
fn play_blocking(
    artifact: Arc<AudioArtifact>,
    stop: StopFlag,
    started: oneshot::Sender<Result<(), PlaybackError>>,
) {
    let opened = (|| {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::Blocked(e.to_string()))?;
        let source = Decoder::new(Cursor::new(ArtifactBytes(artifact)))
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;
        sink.append(source);
        Ok::<_, PlaybackError>((stream, sink))
    })();

    match opened {
        Ok((_stream, sink)) => {
            let _ = started.send(Ok(()));
            while !sink.empty() && !stop.load(Ordering::SeqCst) {
                std::thread::sleep(STOP_POLL);
            }
            sink.stop();
            debug!("playback finished");
        }
        Err(e) => {
            let _ = started.send(Err(e));
        }
    }
}

#[async_trait]
impl PlaybackSink for RodioPlaybackSink {
    type Reference = PlaybackRef;

    fn attach(&self, artifact: &AudioArtifact) -> PlaybackRef {
        let reference = PlaybackRef(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        if let Ok(mut map) = self.attached.lock() {
            map.insert(
                reference,
                Attached {
                    artifact: Arc::new(artifact.clone()),
                    playing: None,
                },
            );
        }
        debug!("attached {} ({})", reference, artifact.human_readable_size());
        reference
    }

    fn revoke(&self, reference: &PlaybackRef) {
        let removed = self
            .attached
            .lock()
            .ok()
            .and_then(|mut map| map.remove(reference));
        if let Some(mut attached) = removed {
            attached.stop_playing();
            debug!("revoked {}", reference);
        }
    }

    async fn play(&self, reference: &PlaybackRef) -> Result<(), PlaybackError> {
        let artifact = self.lookup(reference).ok_or(PlaybackError::Revoked)?;
        if artifact.is_empty() {
            return Err(PlaybackError::Decode("recording is empty".into()));
        }
        let (artifact, stop) = self
            .begin_playback(reference)
            .ok_or(PlaybackError::Revoked)?;

        let (started_tx, started_rx) = oneshot::channel();
        std::thread::Builder::new()
            .name("voice-memo-playback".into())
            .spawn(move || play_blocking(artifact, stop, started_tx))
            .map_err(|e| PlaybackError::Blocked(format!("playback thread: {}", e)))?;

        started_rx
            .await
            .map_err(|_| PlaybackError::Blocked("playback thread exited".into()))?
    }
}
