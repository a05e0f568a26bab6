//! CLI presenter for output formatting

use std::time::Duration as StdDuration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::recorder::{Availability, RecorderState, Status};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(StdDuration::from_millis(80));
        self.spinner = Some(spinner);
    }

    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.emit(format!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.emit(format!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.emit(format!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.emit(format!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Report a status change, colored by outcome
    pub fn status(&self, status: &Status) {
        let text = status.to_string();
        match status {
            Status::Failed(_) => self.error(&text),
            Status::Ready { .. } | Status::Playing => self.success(&text),
            _ => self.info(&text),
        }
    }

    /// Full snapshot for the `status` command
    pub fn snapshot(&self, state: RecorderState, status: &Status, availability: Availability) {
        self.emit(format!("{} state: {}", "●".cyan(), state));
        self.status(status);
        self.emit(format!(
            "{} actions: {}",
            "●".cyan(),
            Self::format_availability(availability)
        ));
    }

    /// Print the command table
    pub fn help(&self, commands: &[(&str, &str)]) {
        for (usage, description) in commands {
            self.emit(format!("  {:<12} {}", usage.cyan(), description));
        }
    }

    /// Enabled actions, with disabled ones dimmed
    pub fn format_availability(availability: Availability) -> String {
        let items = [
            ("record", availability.record),
            ("stop", availability.stop),
            ("play", availability.play),
            ("clear", availability.clear),
        ];
        items
            .iter()
            .map(|(name, enabled)| {
                if *enabled {
                    name.bold().to_string()
                } else {
                    name.dimmed().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format recording progress bar
    pub fn format_progress(&self, elapsed_ms: u64, total_ms: u64) -> String {
        let elapsed_secs = elapsed_ms / 1000;
        let total_secs = total_ms / 1000;
        let percent = if total_ms > 0 {
            (elapsed_ms as f64 / total_ms as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let bar_width = 20;
        let filled = ((percent / 100.0) * bar_width as f64) as usize;
        let empty = bar_width - filled;

        format!(
            "[{}{}] {:>3}s / {}s",
            "█".repeat(filled).red(),
            "░".repeat(empty),
            elapsed_secs,
            total_secs
        )
    }

    /// Update recording progress
    pub fn update_recording_progress(&self, elapsed_ms: u64, total_ms: u64) {
        let progress = self.format_progress(elapsed_ms, total_ms);
        self.update_spinner(&format!("Recording... {}", progress));
    }

    /// Lines printed while the spinner runs go above it
    fn emit(&self, line: String) {
        match self.spinner {
            Some(ref spinner) => spinner.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_progress_at_start() {
        let presenter = Presenter::new();
        let progress = presenter.format_progress(0, 10000);
        assert!(progress.contains("0s / 10s"));
    }

    #[test]
    fn format_progress_clamps_past_end() {
        let presenter = Presenter::new();
        let progress = presenter.format_progress(15000, 10000);
        assert!(progress.contains("15s / 10s"));
        assert!(!progress.contains('░'));
    }

    #[test]
    fn availability_lists_every_action() {
        colored::control::set_override(false);
        let text = Presenter::format_availability(RecorderState::Ready.availability());
        assert_eq!(text, "record stop play clear");
    }

    #[test]
    fn spinner_lifecycle() {
        let mut presenter = Presenter::new();
        presenter.start_spinner("Recording...");
        assert!(presenter.is_spinning());
        presenter.stop_spinner();
        assert!(!presenter.is_spinning());
    }
}
