//! Interactive session runner

use std::process::ExitCode;
use std::time::Duration as StdDuration;

use log::{debug, info};
use tokio::time::{interval, MissedTickBehavior};

use crate::application::ports::{CaptureDevice, ConfigStore, PlaybackSink};
use crate::application::RecordingController;
use crate::domain::audio::parse_type_list;
use crate::domain::config::AppConfig;
use crate::domain::recorder::{Action, RecorderState, Status};
use crate::domain::recording::Duration;
use crate::infrastructure::{CpalCaptureDevice, RodioPlaybackSink, XdgConfigStore};

use super::args::SessionOptions;
use super::command::{Command, HELP};
use super::config_cmd::check_sample_rate;
use super::presenter::Presenter;
use super::signals::{SessionSignal, SessionSignalHandler};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How often the recording progress and max-duration check run
const PROGRESS_TICK: StdDuration = StdDuration::from_millis(100);

/// Why the session loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The user typed `quit`
    Quit,
    /// Signal or end of input
    Shutdown,
}

/// Run an interactive recorder session on stdin until quit or shutdown
pub async fn run_session(options: SessionOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let mut signals = match SessionSignalHandler::new() {
        Ok(signals) => signals,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let device = CpalCaptureDevice::new()
        .with_device(options.input_device.clone())
        .with_sample_rate(options.sample_rate);
    let mut controller = RecordingController::new(device, RodioPlaybackSink::new())
        .with_preferred_types(options.preferred_types.clone());

    info!(
        "session started: max {} at {} Hz, device {}",
        options.max_duration,
        options.sample_rate,
        options.input_device.as_deref().unwrap_or("(default)")
    );
    presenter.info("Ready. Type 'help' for commands.");

    let exit = session_loop(
        &mut controller,
        &mut signals,
        &mut presenter,
        options.max_duration,
    )
    .await;
    debug!("session loop ended: {:?}", exit);

    controller.shutdown();
    presenter.stop_spinner();
    presenter.info("Bye");

    ExitCode::from(EXIT_SUCCESS)
}

/// Drive `controller` from `signals` until the user quits or input ends.
///
/// Recordings running longer than `max_duration` are stopped automatically.
pub async fn session_loop<D, P>(
    controller: &mut RecordingController<D, P>,
    signals: &mut SessionSignalHandler,
    presenter: &mut Presenter,
    max_duration: Duration,
) -> LoopExit
where
    D: CaptureDevice,
    P: PlaybackSink,
{
    let mut ticker = interval(PROGRESS_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shown = controller.status().clone();

    loop {
        let mut acted = false;
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(SessionSignal::Command(Command::Quit)) => return LoopExit::Quit,
                Some(SessionSignal::Command(command)) => {
                    acted = apply_command(controller, presenter, command);
                }
                Some(SessionSignal::Unknown(message)) => presenter.warn(&message),
                Some(SessionSignal::Shutdown) | None => return LoopExit::Shutdown,
            },
            Some(event) = controller.next_event() => controller.handle_event(event),
            _ = ticker.tick() => check_progress(controller, presenter, max_duration),
        }

        sync_display(controller, presenter, &mut shown, acted, max_duration);
    }
}

/// Returns true when a recorder action was accepted
fn apply_command<D, P>(
    controller: &mut RecordingController<D, P>,
    presenter: &Presenter,
    command: Command,
) -> bool
where
    D: CaptureDevice,
    P: PlaybackSink,
{
    let result = match command {
        Command::Action(Action::Record) => controller.record(),
        Command::Action(Action::Stop) => controller.stop(),
        Command::Action(Action::Play) => controller.play(),
        Command::Action(Action::Clear) => controller.clear(),
        Command::Status => {
            presenter.snapshot(
                controller.state(),
                controller.status(),
                controller.availability(),
            );
            if let Some(artifact) = controller.artifact() {
                presenter.info(&format!(
                    "recording: {} (.{}), {}",
                    artifact.mime_type(),
                    artifact.mime_type().extension(),
                    artifact.human_readable_size()
                ));
            }
            Ok(())
        }
        Command::Help => {
            presenter.help(HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    match result {
        Ok(()) => matches!(command, Command::Action(_)),
        Err(rejected) => {
            presenter.warn(&rejected.to_string());
            false
        }
    }
}

fn check_progress<D, P>(
    controller: &mut RecordingController<D, P>,
    presenter: &Presenter,
    max_duration: Duration,
) where
    D: CaptureDevice,
    P: PlaybackSink,
{
    if controller.state() != RecorderState::Recording {
        return;
    }
    let Some(elapsed) = controller.elapsed() else {
        return;
    };

    if elapsed >= max_duration.as_std() {
        presenter.warn("Max duration reached, auto-stopping");
        let _ = controller.stop();
    } else {
        presenter.update_recording_progress(elapsed.as_millis() as u64, max_duration.as_millis());
    }
}

/// A status is shown when it changes. A failure is repeated after every
/// accepted action so a retry that fails the same way is still reported.
fn needs_report(status: &Status, shown: &Status, acted: bool) -> bool {
    *status != *shown || (acted && matches!(status, Status::Failed(_)))
}

/// Print the status when needed and keep the spinner in step with it
fn sync_display<D, P>(
    controller: &RecordingController<D, P>,
    presenter: &mut Presenter,
    shown: &mut Status,
    acted: bool,
    max_duration: Duration,
) where
    D: CaptureDevice,
    P: PlaybackSink,
{
    let status = controller.status();
    if !needs_report(status, shown, acted) {
        return;
    }

    let recording = controller.state() == RecorderState::Recording;
    if !recording {
        presenter.stop_spinner();
    }
    presenter.status(status);
    if recording && !presenter.is_spinning() {
        presenter.start_spinner("Recording...");
        presenter.update_recording_progress(0, max_duration.as_millis());
    }

    *shown = status.clone();
}

/// Load and merge configuration: defaults < file < cli
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring config file {}: {}", store.path().display(), e);
            AppConfig::empty()
        }
    };

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Validate a merged config into session options.
///
/// Errors are usage errors: the message names the offending setting.
pub fn session_options(config: &AppConfig) -> Result<SessionOptions, String> {
    let max_duration = match config.max_duration.as_deref() {
        Some(s) => s
            .parse::<Duration>()
            .map_err(|e| format!("Invalid max-duration: {}", e))?,
        None => config.max_duration_or_default(),
    };

    let preferred_types = match config.preferred_types.as_deref() {
        Some(s) => {
            let types = parse_type_list(s).map_err(|e| format!("Invalid prefer list: {}", e))?;
            if types.is_empty() {
                return Err("Invalid prefer list: no types given".to_string());
            }
            types
        }
        None => config.preferred_types_or_default(),
    };

    let sample_rate = match config.sample_rate {
        Some(rate) => {
            check_sample_rate(rate).map_err(|e| format!("Invalid sample rate: {}", e))?
        }
        None => config.sample_rate_or_default(),
    };

    Ok(SessionOptions {
        max_duration,
        preferred_types,
        sample_rate,
        input_device: config.input_device().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        CaptureError, EncoderEvents, EncoderHandle, StreamConstraints, StreamHandle,
    };
    use crate::domain::audio::MimeType;
    use crate::domain::config::DEFAULT_SAMPLE_RATE;
    use crate::domain::error::RecorderError;
    use async_trait::async_trait;

    /// Host without any microphone
    struct NoMicrophone;

    struct NoStream;

    impl StreamHandle for NoStream {
        fn release_all_tracks(&mut self) {}
    }

    struct NoEncoder(MimeType);

    impl EncoderHandle for NoEncoder {
        fn mime_type(&self) -> &MimeType {
            &self.0
        }
        fn start(&mut self) -> Result<(), CaptureError> {
            Ok(())
        }
        fn stop(&mut self) -> Result<(), CaptureError> {
            Ok(())
        }
    }

    #[async_trait]
    impl CaptureDevice for NoMicrophone {
        type Stream = NoStream;
        type Encoder = NoEncoder;

        fn is_available(&self) -> bool {
            false
        }

        async fn request_stream(&self, _: StreamConstraints) -> Result<NoStream, CaptureError> {
            Err(CaptureError::Unavailable)
        }

        fn negotiate_encoder(
            &self,
            _: &NoStream,
            _: &[MimeType],
            _: EncoderEvents,
        ) -> Result<NoEncoder, CaptureError> {
            Err(CaptureError::Unavailable)
        }
    }

    async fn run_script(
        script: &'static [u8],
    ) -> (LoopExit, RecordingController<NoMicrophone, RodioPlaybackSink>) {
        let mut controller = RecordingController::new(NoMicrophone, RodioPlaybackSink::new());
        let mut signals = SessionSignalHandler::with_input(script).unwrap();
        let mut presenter = Presenter::new();
        let exit = session_loop(
            &mut controller,
            &mut signals,
            &mut presenter,
            Duration::from_secs(5),
        )
        .await;
        (exit, controller)
    }

    #[tokio::test]
    async fn quit_command_ends_loop() {
        let (exit, controller) = run_script(b"status\nhelp\nquit\n").await;
        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(controller.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn end_of_input_shuts_down() {
        let (exit, _) = run_script(b"play\n").await;
        assert_eq!(exit, LoopExit::Shutdown);
    }

    #[tokio::test]
    async fn record_without_microphone_reports_unsupported() {
        let (exit, controller) = run_script(b"record\nclear\nquit\n").await;
        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(controller.state(), RecorderState::Idle);
        assert_eq!(
            controller.status(),
            &Status::Failed(RecorderError::UnsupportedCapability)
        );
    }

    #[test]
    fn repeated_failure_is_reported_after_each_action() {
        let failed = Status::Failed(RecorderError::UnsupportedCapability);

        assert!(needs_report(&failed, &Status::Idle, false));
        assert!(needs_report(&failed, &failed, true));
        assert!(!needs_report(&failed, &failed, false));
        assert!(!needs_report(&Status::Recording, &Status::Recording, true));
    }

    #[test]
    fn defaults_resolve_to_session_options() {
        let options = session_options(&AppConfig::defaults()).unwrap();
        assert_eq!(options.max_duration, Duration::default_max_duration());
        assert_eq!(options.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(options.preferred_types[0].as_str(), "audio/webm;codecs=opus");
        assert!(options.input_device.is_none());
    }

    #[test]
    fn cli_values_override_file_values() {
        let file = AppConfig {
            sample_rate: Some(44_100),
            max_duration: Some("5m".into()),
            ..Default::default()
        };
        let cli = AppConfig {
            max_duration: Some("30s".into()),
            preferred_types: Some("audio/wav".into()),
            ..Default::default()
        };
        let merged = AppConfig::defaults().merge(file).merge(cli);
        let options = session_options(&merged).unwrap();

        assert_eq!(options.max_duration, Duration::from_secs(30));
        assert_eq!(options.sample_rate, 44_100);
        assert_eq!(options.preferred_types.len(), 1);
    }

    #[test]
    fn invalid_values_are_usage_errors() {
        let bad_duration = AppConfig {
            max_duration: Some("soon".into()),
            ..Default::default()
        };
        assert!(session_options(&bad_duration)
            .unwrap_err()
            .contains("max-duration"));

        let bad_rate = AppConfig {
            sample_rate: Some(1),
            ..Default::default()
        };
        assert!(session_options(&bad_rate).unwrap_err().contains("sample rate"));

        let bad_types = AppConfig {
            preferred_types: Some("wav".into()),
            ..Default::default()
        };
        assert!(session_options(&bad_types).unwrap_err().contains("prefer"));
    }
}
