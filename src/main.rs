//! voice-memo CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_memo::cli::{
    app::{load_merged_config, run_session, session_options, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use voice_memo::domain::config::AppConfig;
use voice_memo::infrastructure::{CpalCaptureDevice, XdgConfigStore};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Devices) => {
            let names = CpalCaptureDevice::input_device_names();
            if names.is_empty() {
                presenter.warn("No input devices found");
            }
            for name in names {
                presenter.output(&name);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        preferred_types: cli.prefer,
        sample_rate: cli.sample_rate,
        max_duration: cli.max_duration,
        input_device: cli.device,
    };

    let config = load_merged_config(cli_config).await;

    let options = match session_options(&config) {
        Ok(options) => options,
        Err(message) => {
            presenter.error(&message);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    run_session(options).await
}
