use crate::AppSettings;
use color_eyre::eyre::{Result, eyre};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config/settings.yaml";
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Load the app settings from `config/settings.yaml` + environment variables.
pub fn load_app_settings() -> Result<AppSettings> {
    load_app_settings_from(Path::new(DEFAULT_CONFIG_PATH))
}

/// Load settings from a YAML file, overridden by `APP__SECTION__KEY` environment variables.
///
/// Missing keys (or a missing file) fall back to the built-in defaults.
pub fn load_app_settings_from(config_path: &Path) -> Result<AppSettings> {
    // Need to load from dotenv so the env overrides and the API key can live in .env.
    dotenv::from_path(".env").ok();
    debug!("Loading settings from {}", config_path.display());

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    Ok(builder.build()?.try_deserialize::<AppSettings>()?)
}

/// The API credential from the environment. The run cannot start without it.
pub fn require_api_key() -> Result<String> {
    api_key_from(std::env::var(API_KEY_VAR).ok())
}

pub fn api_key_from(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(eyre!("Missing API key: set {API_KEY_VAR}")),
    }
}
