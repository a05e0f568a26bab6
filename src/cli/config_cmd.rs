//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::audio::parse_type_list;
use crate::domain::config::{AppConfig, SAMPLE_RATE_RANGE};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;
    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    presenter.output(lookup(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, lookup(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Validate `value` for `key` and store it in `config`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "preferred_types" => {
            let types = parse_type_list(value).map_err(|e| invalid(key, e.to_string()))?;
            if types.is_empty() {
                return Err(invalid(key, "List must name at least one type"));
            }
            let normalized: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
            config.preferred_types = Some(normalized.join(","));
        }
        "sample_rate" => {
            let rate = parse_sample_rate(value).map_err(|message| invalid(key, message))?;
            config.sample_rate = Some(rate);
        }
        "max_duration" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config.max_duration = Some(duration.to_string());
        }
        "input_device" => {
            let name = value.trim();
            config.input_device = if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            };
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn lookup(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "preferred_types" => config.preferred_types.clone(),
        "sample_rate" => config.sample_rate.map(|r| r.to_string()),
        "max_duration" => config.max_duration.clone(),
        "input_device" => config.input_device.clone(),
        _ => None,
    }
}

/// Parse a sample rate and check it is in range
pub fn parse_sample_rate(value: &str) -> Result<u32, String> {
    let rate: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number of Hz", value))?;
    check_sample_rate(rate)
}

/// Check a sample rate is in the supported range
pub fn check_sample_rate(rate: u32) -> Result<u32, String> {
    if !SAMPLE_RATE_RANGE.contains(&rate) {
        return Err(format!(
            "{} Hz is outside {}-{} Hz",
            rate,
            SAMPLE_RATE_RANGE.start(),
            SAMPLE_RATE_RANGE.end()
        ));
    }
    Ok(rate)
}
