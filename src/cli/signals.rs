//! Session input: stdin commands and shutdown signals on one channel

use std::io::BufRead;

use colored::Colorize;
use log::debug;
use tokio::sync::mpsc;

use super::command::Command;

/// Everything the interactive loop reacts to besides controller events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    Command(Command),
    /// A line that did not parse; carries the message to show
    Unknown(String),
    /// SIGINT, SIGTERM, or end of input
    Shutdown,
}

/// Merges stdin lines and OS shutdown signals into one receiver
pub struct SessionSignalHandler {
    receiver: mpsc::Receiver<SessionSignal>,
}

impl SessionSignalHandler {
    /// Listen on the process stdin and install signal handlers
    pub fn new() -> Result<Self, std::io::Error> {
        Self::with_input(std::io::BufReader::new(std::io::stdin()))
    }

    /// Listen on `input` instead of stdin.
    ///
    /// Lines are read on a detached thread: a blocking read cannot be
    /// cancelled and must not hold up runtime shutdown.
    pub fn with_input<R>(input: R) -> Result<Self, std::io::Error>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);

        install_shutdown_handlers(&tx)?;

        std::thread::Builder::new()
            .name("voice-memo-stdin".into())
            .spawn(move || read_lines(input, tx))?;

        Ok(Self { receiver: rx })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<SessionSignal> {
        self.receiver.recv().await
    }
}

fn read_lines<R: BufRead>(input: R, tx: mpsc::Sender<SessionSignal>) {
    for line in input.lines() {
        let signal = match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match line.parse::<Command>() {
                Ok(command) => SessionSignal::Command(command),
                Err(message) => SessionSignal::Unknown(message),
            },
            Err(e) => {
                debug!("stdin read failed: {}", e);
                break;
            }
        };
        if tx.blocking_send(signal).is_err() {
            return;
        }
    }
    debug!("stdin closed");
    let _ = tx.blocking_send(SessionSignal::Shutdown);
}

#[cfg(unix)]
fn install_shutdown_handlers(tx: &mpsc::Sender<SessionSignal>) -> Result<(), std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let tx_int = tx.clone();
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        sigint.recv().await;
        eprintln!("{} Received SIGINT (shutdown)", "↓".cyan());
        let _ = tx_int.send(SessionSignal::Shutdown).await;
    });

    let tx_term = tx.clone();
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        sigterm.recv().await;
        eprintln!("{} Received SIGTERM (shutdown)", "↓".cyan());
        let _ = tx_term.send(SessionSignal::Shutdown).await;
    });

    Ok(())
}

#[cfg(not(unix))]
fn install_shutdown_handlers(tx: &mpsc::Sender<SessionSignal>) -> Result<(), std::io::Error> {
    let tx_int = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{} Received Ctrl-C (shutdown)", "↓".cyan());
            let _ = tx_int.send(SessionSignal::Shutdown).await;
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recorder::Action;

    #[tokio::test]
    async fn lines_become_commands_then_shutdown_on_eof() {
        let input: &'static [u8] = b"record\n\n  \nstop\nwat\n";
        let mut handler = SessionSignalHandler::with_input(input).unwrap();

        assert_eq!(
            handler.recv().await,
            Some(SessionSignal::Command(Command::Action(Action::Record)))
        );
        assert_eq!(
            handler.recv().await,
            Some(SessionSignal::Command(Command::Action(Action::Stop)))
        );
        assert!(matches!(
            handler.recv().await,
            Some(SessionSignal::Unknown(message)) if message.contains("wat")
        ));
        assert_eq!(handler.recv().await, Some(SessionSignal::Shutdown));
    }

    #[test]
    fn signal_equality() {
        assert_eq!(SessionSignal::Shutdown, SessionSignal::Shutdown);
        assert_ne!(
            SessionSignal::Command(Command::Quit),
            SessionSignal::Shutdown
        );
    }
}
