//! Microphone capture using cpal
//!
//! `cpal::Stream` is not `Send`, so every granted stream lives on its own
//! capture thread. The handle returned to the controller only holds the
//! shared sample buffer and the flags that drive that thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, PlayStreamError, SampleFormat, SampleRate, StreamConfig};
use log::{debug, info, warn};
use tokio::sync::oneshot;

use super::codec::Codec;
use super::resample::{f32_to_i16, mix_to_mono, resample};
use crate::application::ports::{
    CaptureDevice, CaptureError, EncoderEvents, EncoderHandle, StreamConstraints, StreamHandle,
};
use crate::domain::audio::{negotiate, MimeType};
use crate::domain::config::DEFAULT_SAMPLE_RATE;

/// How often the capture thread re-checks its flags
const PARK_INTERVAL: StdDuration = StdDuration::from_millis(50);

/// Format the device actually delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// State shared between a stream handle, its encoder and the capture thread
#[derive(Default)]
struct CaptureShared {
    /// Mono samples at the device rate
    buffer: StdMutex<Vec<i16>>,
    /// Samples are only kept while an encoder is running
    capturing: AtomicBool,
    /// Capture thread keeps the device open while set
    active: AtomicBool,
    /// Where device errors go while capturing
    events: StdMutex<Option<EncoderEvents>>,
}

impl CaptureShared {
    fn push(&self, mono: &[i16]) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.extend_from_slice(mono);
        }
    }

    fn report_failure(&self, detail: String) {
        if !self.capturing.load(Ordering::SeqCst) {
            return;
        }
        let events = self.events.lock().ok().and_then(|guard| guard.clone());
        if let Some(events) = events {
            events.failed(CaptureError::Failed(detail));
        }
    }

    /// Only a lost device ends the session; other stream errors are glitches
    fn on_stream_error(&self, err: cpal::StreamError) {
        match &err {
            cpal::StreamError::DeviceNotAvailable => {
                warn!("audio input device lost");
                self.report_failure(err.to_string());
            }
            other => warn!("audio input stream error: {}", other),
        }
    }
}

/// Capture device backed by the host's audio input
pub struct CpalCaptureDevice {
    device_name: Option<String>,
    target_sample_rate: u32,
}

impl CpalCaptureDevice {
    /// Default input device, encoding at the default sample rate
    pub fn new() -> Self {
        Self {
            device_name: None,
            target_sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Select an input device by name instead of the host default
    pub fn with_device(mut self, name: Option<String>) -> Self {
        self.device_name = name;
        self
    }

    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.target_sample_rate = rate;
        self
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Names of every input device the host reports
    pub fn input_device_names() -> Vec<String> {
        cpal::default_host()
            .input_devices()
            .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
            .unwrap_or_default()
    }

    fn find_device(name: Option<&str>) -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        match name {
            None => host.default_input_device().ok_or(CaptureError::Unavailable),
            Some(wanted) => host
                .input_devices()
                .map_err(|e| CaptureError::StartFailed(e.to_string()))?
                .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                .ok_or_else(|| {
                    CaptureError::StartFailed(format!("input device '{}' not found", wanted))
                }),
        }
    }

    /// Pick an i16/f32 config, preferring fewer channels and one that
    /// covers the target rate.
    fn input_config(
        device: &cpal::Device,
        target_rate: u32,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported = device
            .supported_input_configs()
            .map_err(|e| CaptureError::StartFailed(format!("failed to query configs: {}", e)))?;

        let covers = |range: &cpal::SupportedStreamConfigRange| {
            range.min_sample_rate().0 <= target_rate && range.max_sample_rate().0 >= target_rate
        };

        let mut best: Option<cpal::SupportedStreamConfigRange> = None;
        for range in supported {
            if range.sample_format() != SampleFormat::I16
                && range.sample_format() != SampleFormat::F32
            {
                continue;
            }
            let is_better = match &best {
                None => true,
                Some(current) => {
                    range.channels() < current.channels() || (covers(&range) && !covers(current))
                }
            };
            if is_better {
                best = Some(range);
            }
        }

        let range = best.ok_or_else(|| {
            CaptureError::StartFailed("no i16 or f32 input config available".into())
        })?;

        let sample_rate = if covers(&range) {
            SampleRate(target_rate)
        } else {
            range.min_sample_rate()
        };

        let config = StreamConfig {
            channels: range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, range.sample_format()))
    }

    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        format: SampleFormat,
        shared: &Arc<CaptureShared>,
    ) -> Result<cpal::Stream, CaptureError> {
        let channels = config.channels;
        let on_error = {
            let shared = Arc::clone(shared);
            move |err: cpal::StreamError| shared.on_stream_error(err)
        };

        let result = match format {
            SampleFormat::I16 => {
                let shared = Arc::clone(shared);
                device.build_input_stream(
                    config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if shared.capturing.load(Ordering::SeqCst) {
                            shared.push(&mix_to_mono(data, channels));
                        }
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::F32 => {
                let shared = Arc::clone(shared);
                device.build_input_stream(
                    config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if shared.capturing.load(Ordering::SeqCst) {
                            shared.push(&mix_to_mono(&f32_to_i16(data), channels));
                        }
                    },
                    on_error,
                    None,
                )
            }
            other => {
                return Err(CaptureError::StartFailed(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };

        result.map_err(|e| match e {
            BuildStreamError::DeviceNotAvailable => {
                CaptureError::PermissionDenied("input device not available".into())
            }
            other => CaptureError::StartFailed(other.to_string()),
        })
    }

    /// Body of the capture thread. Reports the opened format (or the
    /// failure) through `ready`, then holds the stream until released.
    fn run_capture(
        name: Option<String>,
        target_rate: u32,
        shared: Arc<CaptureShared>,
        ready: oneshot::Sender<Result<CaptureFormat, CaptureError>>,
    ) {
        let opened = (|| {
            let device = Self::find_device(name.as_deref())?;
            let (config, sample_format) = Self::input_config(&device, target_rate)?;
            let stream = Self::build_stream(&device, &config, sample_format, &shared)?;
            stream.play().map_err(|e| match e {
                PlayStreamError::DeviceNotAvailable => {
                    CaptureError::PermissionDenied("input device not available".into())
                }
                other => CaptureError::StartFailed(other.to_string()),
            })?;
            let format = CaptureFormat {
                sample_rate: config.sample_rate.0,
                channels: config.channels,
            };
            Ok::<_, CaptureError>((stream, format))
        })();

        let stream = match opened {
            Ok((stream, format)) => {
                debug!(
                    "capture opened at {} Hz, {} channel(s)",
                    format.sample_rate, format.channels
                );
                if ready.send(Ok(format)).is_err() {
                    // Requester went away before the grant arrived
                    return;
                }
                stream
            }
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        while shared.active.load(Ordering::SeqCst) {
            std::thread::park_timeout(PARK_INTERVAL);
        }

        drop(stream);
        debug!("capture thread released the input device");
    }
}

impl Default for CpalCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    type Stream = CpalStream;
    type Encoder = CpalEncoder;

    fn is_available(&self) -> bool {
        cpal::default_host()
            .input_devices()
            .map(|mut devices| devices.next().is_some())
            .unwrap_or(false)
    }

    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<CpalStream, CaptureError> {
        if !constraints.audio {
            return Err(CaptureError::StartFailed("no audio track requested".into()));
        }

        let shared = Arc::new(CaptureShared::default());
        shared.active.store(true, Ordering::SeqCst);

        let (ready_tx, ready_rx) = oneshot::channel();
        let name = self.device_name.clone();
        let target_rate = self.target_sample_rate;
        let thread_shared = Arc::clone(&shared);

        let handle = std::thread::Builder::new()
            .name("voice-memo-capture".into())
            .spawn(move || Self::run_capture(name, target_rate, thread_shared, ready_tx))
            .map_err(|e| CaptureError::StartFailed(format!("capture thread: {}", e)))?;

        let format = match ready_rx.await {
            Ok(result) => result,
            Err(_) => Err(CaptureError::StartFailed(
                "capture thread exited before opening the device".into(),
            )),
        };

        match format {
            Ok(format) => Ok(CpalStream {
                shared,
                format,
                thread: Some(handle),
            }),
            Err(e) => {
                shared.active.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
        }
    }

    fn negotiate_encoder(
        &self,
        stream: &CpalStream,
        preferred: &[MimeType],
        events: EncoderEvents,
    ) -> Result<CpalEncoder, CaptureError> {
        let codec = negotiate(preferred, |t| Codec::for_mime(t).is_some())
            .and_then(Codec::for_mime)
            .unwrap_or_default();
        debug!("negotiated {:?} for session {}", codec, events.session());

        Ok(CpalEncoder {
            shared: Arc::clone(&stream.shared),
            format: stream.format,
            codec,
            mime_type: codec.mime_type(),
            target_sample_rate: self.target_sample_rate,
            events,
            started: false,
        })
    }
}

/// A live input stream held open by its capture thread
pub struct CpalStream {
    shared: Arc<CaptureShared>,
    format: CaptureFormat,
    thread: Option<JoinHandle<()>>,
}

impl CpalStream {
    pub fn format(&self) -> CaptureFormat {
        self.format
    }
}

impl StreamHandle for CpalStream {
    fn release_all_tracks(&mut self) {
        self.shared.capturing.store(false, Ordering::SeqCst);
        self.shared.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("capture thread panicked");
            }
            info!("microphone released");
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.release_all_tracks();
    }
}

/// Buffers samples while started and encodes them in one piece on stop
pub struct CpalEncoder {
    shared: Arc<CaptureShared>,
    format: CaptureFormat,
    codec: Codec,
    mime_type: MimeType,
    target_sample_rate: u32,
    events: EncoderEvents,
    started: bool,
}

impl CpalEncoder {
    fn encode_and_report(
        samples: Vec<i16>,
        source_rate: u32,
        target_rate: u32,
        codec: Codec,
        events: EncoderEvents,
    ) {
        if samples.is_empty() {
            debug!("no samples captured for session {}", events.session());
            events.finalized();
            return;
        }

        let encoded = resample(&samples, source_rate, target_rate)
            .and_then(|pcm| codec.encode(&pcm, target_rate));

        match encoded {
            Ok(bytes) => {
                debug!("encoded {} bytes as {:?}", bytes.len(), codec);
                events.chunk(bytes);
                events.finalized();
            }
            Err(e) => {
                events.failed(CaptureError::EncodingFailed(e.to_string()));
            }
        }
    }
}

impl EncoderHandle for CpalEncoder {
    fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.started {
            return Err(CaptureError::StartFailed("encoder already started".into()));
        }
        if !self.shared.active.load(Ordering::SeqCst) {
            return Err(CaptureError::StartFailed("stream already released".into()));
        }

        if let Ok(mut buffer) = self.shared.buffer.lock() {
            buffer.clear();
        }
        if let Ok(mut events) = self.shared.events.lock() {
            *events = Some(self.events.clone());
        }
        self.shared.capturing.store(true, Ordering::SeqCst);
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.started {
            return Err(CaptureError::Failed("encoder not started".into()));
        }
        self.started = false;
        self.shared.capturing.store(false, Ordering::SeqCst);
        if let Ok(mut events) = self.shared.events.lock() {
            *events = None;
        }

        let samples = self
            .shared
            .buffer
            .lock()
            .map(|mut buffer| std::mem::take(&mut *buffer))
            .unwrap_or_default();

        let source_rate = self.format.sample_rate;
        let target_rate = self.target_sample_rate;
        let codec = self.codec;
        let events = self.events.clone();
        let job = move || Self::encode_and_report(samples, source_rate, target_rate, codec, events);

        // Encoding is CPU bound; keep it off the async workers when possible
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
        Ok(())
    }
}
