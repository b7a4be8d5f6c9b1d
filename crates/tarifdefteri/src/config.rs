//! Configuration management for tarifdefteri.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::recipe::{
    TextStyle, DEFAULT_FONT_COLOR, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, FONT_SIZE_RANGE,
};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "tarifdefteri";

/// Default database file name for local mode.
const DATABASE_FILE_NAME: &str = "notebook.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TARIF_`, sections split by `__`)
/// 2. TOML config file at `~/.config/tarifdefteri/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote backend configuration.
    pub backend: BackendConfig,
    /// Local (on-device) storage configuration.
    pub local: LocalConfig,
    /// Editor defaults.
    pub editor: EditorConfig,
}

/// Remote backend configuration.
///
/// The presence of `api_key` selects remote mode for the whole process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the recipe document API.
    pub api_url: Option<String>,
    /// Base URL of the image blob store.
    pub storage_url: Option<String>,
    /// Credential sent as a bearer token.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Path to the device database file.
    /// Defaults to `~/.local/share/tarifdefteri/notebook.db`
    pub database_path: Option<PathBuf>,
}

/// Defaults applied by the recipe editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size for new recipes, in pixels.
    pub default_font_size: u32,
    /// CSS font family for new recipes.
    pub default_font_family: String,
    /// `#rrggbb` font color for new recipes.
    pub default_font_color: String,
    /// Smallest edge, in pixels, an image may be resized to.
    pub min_image_px: u32,
    /// Initial width and height of an uploaded image, percent of the page.
    pub new_image_size_pct: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            storage_url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            default_font_family: DEFAULT_FONT_FAMILY.to_string(),
            default_font_color: DEFAULT_FONT_COLOR.to_string(),
            min_image_px: 50,
            new_image_size_pct: 25.0,
        }
    }
}

impl BackendConfig {
    /// Whether remote credentials are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl EditorConfig {
    /// Text style applied to new recipes.
    #[must_use]
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_size: self.default_font_size,
            font_family: self.default_font_family.clone(),
            font_color: self.default_font_color.clone(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `TARIF_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("TARIF_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.backend.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        if !FONT_SIZE_RANGE.contains(&self.editor.default_font_size) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "default_font_size ({}) must be between {} and {}",
                    self.editor.default_font_size,
                    FONT_SIZE_RANGE.start(),
                    FONT_SIZE_RANGE.end()
                ),
            });
        }

        let hex_color = regex::Regex::new(r"^#[0-9a-fA-F]{6}$")
            .map_err(|e| Error::internal(format!("color pattern: {e}")))?;
        if !hex_color.is_match(&self.editor.default_font_color) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "default_font_color must look like #rrggbb, got {}",
                    self.editor.default_font_color
                ),
            });
        }

        if self.editor.min_image_px == 0 {
            return Err(Error::ConfigValidation {
                message: "min_image_px must be greater than 0".to_string(),
            });
        }

        let size = self.editor.new_image_size_pct;
        if !(size > 0.0 && size <= 100.0) {
            return Err(Error::ConfigValidation {
                message: format!("new_image_size_pct ({size}) must be in (0, 100]"),
            });
        }

        Ok(())
    }

    /// Get the local database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.local
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the remote request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.backend.api_key.is_none());
        assert!(!config.backend.has_credentials());
        assert_eq!(config.editor.default_font_size, 16);
        assert_eq!(config.editor.default_font_family, "Georgia, serif");
        assert_eq!(config.editor.default_font_color, "#5D4037");
    }

    #[test]
    fn test_default_backend_config() {
        let backend = BackendConfig::default();

        assert!(backend.api_url.is_none());
        assert!(backend.storage_url.is_none());
        assert_eq!(backend.timeout_secs, 30);
    }

    #[test]
    fn test_default_editor_config() {
        let editor = EditorConfig::default();

        assert_eq!(editor.min_image_px, 50);
        assert!((editor.new_image_size_pct - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_api_key_is_not_credentials() {
        let mut backend = BackendConfig::default();
        backend.api_key = Some("   ".to_string());
        assert!(!backend.has_credentials());

        backend.api_key = Some("secret".to_string());
        assert!(backend.has_credentials());
    }

    #[test]
    fn test_editor_text_style() {
        let mut editor = EditorConfig::default();
        assert_eq!(editor.text_style(), TextStyle::default());

        editor.default_font_size = 20;
        assert_eq!(editor.text_style().font_size, 20);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.backend.timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_font_size_range() {
        let mut config = Config::default();
        config.editor.default_font_size = 40;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_font_size"));
    }

    #[test]
    fn test_validate_font_color() {
        let mut config = Config::default();
        config.editor.default_font_color = "brown".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("#rrggbb"));
    }

    #[test]
    fn test_validate_min_image_px() {
        let mut config = Config::default();
        config.editor.min_image_px = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_new_image_size() {
        let mut config = Config::default();
        config.editor.new_image_size_pct = 0.0;
        assert!(config.validate().is_err());

        config.editor.new_image_size_pct = 150.0;
        assert!(config.validate().is_err());

        config.editor.new_image_size_pct = 100.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("notebook.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.local.database_path = Some(PathBuf::from("/custom/path/notebook.db"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/notebook.db")
        );
    }

    #[test]
    fn test_request_timeout() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("tarifdefteri"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "tarifdefteri_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"
            [backend]
            api_url = "https://api.example.com"
            api_key = "k"

            [editor]
            default_font_size = 18
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(
            config.backend.api_url.as_deref(),
            Some("https://api.example.com")
        );
        assert!(config.backend.has_credentials());
        assert_eq!(config.editor.default_font_size, 18);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_toml_tables_map_onto_sections() {
        let path = std::env::temp_dir().join(format!(
            "tarifdefteri_config_sections_{}.toml",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(
            &path,
            r#"
            [local]
            database_path = "/tmp/tarif/notebook.db"

            [editor]
            new_image_size_pct = 40.0
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/tarif/notebook.db"));
        assert_eq!(config.editor.new_image_size_pct, 40.0);
        assert_eq!(config.backend, BackendConfig::default());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_editor_config_deserialize() {
        let json = r#"{"default_font_size": 20, "min_image_px": 64}"#;
        let editor: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(editor.default_font_size, 20);
        assert_eq!(editor.min_image_px, 64);
        assert_eq!(editor.default_font_family, "Georgia, serif");
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("timeout_secs"));
        assert!(json.contains("default_font_color"));
    }
}
