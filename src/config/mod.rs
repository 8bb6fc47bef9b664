pub mod settings;

// Re-export commonly used types
pub use settings::{ServerSettings, SettingsError, CDN_DIRECTORY_VAR, ENV_DIR_VAR};
