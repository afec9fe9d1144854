//! Shared configuration loader for chat-export.
//!
//! `defaults/chat-export.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`ExportConfig`].

use chat_export::Landmarks;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/chat-export.default.toml");

const APP_DIR_NAME: &str = "chat-export";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration consumed by chat-export applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub landmarks: Landmarks,
}

/// Where exported documents go.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive applied when `RUST_LOG` is not set.
    pub filter: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer the per-user file, if the platform has a config directory.
    pub fn with_user_file(self) -> Self {
        match user_config_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ExportConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// `<platform config dir>/chat-export/config.toml`, e.g. `~/.config/chat-export/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ExportConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn default_landmarks_match_library_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.landmarks, Landmarks::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("output.directory", "exports")
            .expect("override to apply")
            .set_override("landmarks.message_id_attribute", "data-id")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.output.directory, PathBuf::from("exports"));
        assert_eq!(config.landmarks.message_id_attribute, "data-id");
        assert_eq!(config.landmarks.rich_content, Landmarks::default().rich_content);
    }
}
