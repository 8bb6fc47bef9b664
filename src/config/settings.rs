use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const ENV_FILE: &str = ".env";
const DEFAULT_ENV_DIR: &str = "/var/www/renderer";
const DEFAULT_CDN_DIRECTORY: &str = "/var/www/cdn";

/// Variable naming the primary `.env` directory.
pub const ENV_DIR_VAR: &str = "RENDERER_ENV_DIR";
/// Variable naming the output root, also the fallback `.env` directory.
pub const CDN_DIRECTORY_VAR: &str = "CDN_DIRECTORY";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Source(#[from] ::config::ConfigError),
}

/// Process-wide service settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_address")]
    pub server_address: String,
    /// Shared secret for the access-key header; empty means "no check".
    #[serde(default)]
    pub post_key: Option<String>,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub cdn_url: String,
    /// Output root; thumbnails go under `<cdn_directory>/thumbnails`.
    #[serde(default = "default_cdn_directory")]
    pub cdn_directory: PathBuf,
    #[serde(default = "default_asset_timeout_secs")]
    pub asset_timeout_secs: u64,
}

fn default_server_address() -> String {
    "0.0.0.0:4316".to_string()
}

fn default_cdn_directory() -> PathBuf {
    PathBuf::from(DEFAULT_CDN_DIRECTORY)
}

fn default_asset_timeout_secs() -> u64 {
    10
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            post_key: None,
            api_url: String::new(),
            cdn_url: String::new(),
            cdn_directory: default_cdn_directory(),
            asset_timeout_secs: default_asset_timeout_secs(),
        }
    }
}

impl ServerSettings {
    /// Load from the process environment, seeded by the first `.env` found in
    /// `$RENDERER_ENV_DIR` or `$CDN_DIRECTORY`.
    pub fn load() -> Result<Self, SettingsError> {
        let env_dir = std::env::var(ENV_DIR_VAR).unwrap_or_else(|_| DEFAULT_ENV_DIR.to_string());
        let cdn_dir = std::env::var(CDN_DIRECTORY_VAR).unwrap_or_else(|_| DEFAULT_CDN_DIRECTORY.to_string());
        Self::load_from(&[PathBuf::from(env_dir), PathBuf::from(cdn_dir)])
    }

    /// Like [`load`](Self::load) with explicit `.env` search directories.
    pub fn load_from(search_dirs: &[PathBuf]) -> Result<Self, SettingsError> {
        Self::load_with(search_dirs, Environment::default())
    }

    /// Layering, lowest first: field defaults, `.env` values, `environment`.
    pub fn load_with(search_dirs: &[PathBuf], environment: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        match find_env_file(search_dirs) {
            Some(path) => {
                info!("Loading settings from {}", path.display());
                for (key, value) in read_env_file(&path)? {
                    builder = builder.set_default(key, value)?;
                }
            }
            None => warn!(".env file not found in search path, relying on environment variables"),
        }

        let settings: ServerSettings = builder.add_source(environment).build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Configured secret, if any. An empty key disables the check.
    pub fn access_key(&self) -> Option<&str> {
        self.post_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }
}

fn find_env_file(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join(ENV_FILE))
        .find(|path| path.is_file())
}

/// `KEY=VALUE` lines, read through the INI parser. Keys come back
/// lowercased with any shell `export ` prefix removed.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, SettingsError> {
    let values = Config::builder()
        .add_source(File::from(path).format(FileFormat::Ini))
        .build()?
        .try_deserialize::<HashMap<String, String>>()?;
    Ok(values
        .into_iter()
        .map(|(key, value)| (env_key(&key), unquote(&value).to_string()))
        .collect())
}

fn env_key(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    match key.strip_prefix("export") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start().to_string(),
        _ => key,
    }
}

/// Drop one pair of matching surrounding quotes.
fn unquote(raw: &str) -> &str {
    let value = raw.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
