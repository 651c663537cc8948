//! TOML Configuration File Support
//!
//! Loads the widget configuration from `~/.config/chat-widget/widget.toml`,
//! the environment, and caller-supplied overrides.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [widget]
//! base_url = "https://example.com/api"
//! storage_key = "chat-widget-session"
//! welcome_message = "Hi! How can I help?"
//! typewriter_speed_ms = 20
//! empty_state_message = "Ask me anything to get started."
//! title = "Support"
//!
//! [http]
//! request_timeout_secs = 30
//!
//! [ui]
//! modal_animation_ms = 200
//!
//! [storage]
//! path = "/home/me/.local/share/chat-widget/storage.json"
//! ```
//!
//! A missing base URL is not a load error. The session manager reports it
//! as a configuration error when it initializes, so the widget still renders.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "chat-widget-session";

/// Milliseconds per character used when none is configured
pub const DEFAULT_TYPEWRITER_SPEED_MS: u64 = 20;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Widget section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetToml {
    /// Backend base URL
    pub base_url: Option<String>,

    /// Durable storage key for the session ID
    pub storage_key: Option<String>,

    /// Greeting shown on first open
    pub welcome_message: Option<String>,

    /// Typewriter speed in milliseconds per character (0 disables animation)
    pub typewriter_speed_ms: Option<u64>,

    /// Text shown when there are no messages
    pub empty_state_message: Option<String>,

    /// Modal title
    pub title: Option<String>,
}

/// HTTP section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpToml {
    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// UI section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// Modal open/close animation length in milliseconds
    pub modal_animation_ms: Option<u64>,
}

/// Storage section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageToml {
    /// Path of the storage file
    pub path: Option<PathBuf>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfigToml {
    /// Widget section
    pub widget: WidgetToml,

    /// HTTP section
    pub http: HttpToml,

    /// UI section
    pub ui: UiToml,

    /// Storage section
    pub storage: StorageToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved widget configuration
#[derive(Clone, Debug)]
pub struct WidgetConfig {
    /// Backend base URL (required for any request)
    pub base_url: Option<String>,

    /// Durable storage key for the session ID
    pub storage_key: String,

    /// Greeting shown on first open
    pub welcome_message: Option<String>,

    /// Typewriter speed in milliseconds per character (0 disables animation)
    pub typewriter_speed_ms: u64,

    /// Text shown when there are no messages
    pub empty_state_message: String,

    /// Modal title
    pub title: String,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Modal open/close animation length
    pub modal_animation: Duration,

    /// Storage file path (`None` = platform default)
    pub storage_path: Option<PathBuf>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            welcome_message: None,
            typewriter_speed_ms: DEFAULT_TYPEWRITER_SPEED_MS,
            empty_state_message: "Ask me anything to get started.".to_string(),
            title: "Chat".to_string(),
            request_timeout: Duration::from_secs(30),
            modal_animation: Duration::from_millis(200),
            storage_path: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl WidgetConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration pointing at a backend, everything else default
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Set the greeting
    #[must_use]
    pub fn welcome(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = Some(message.into());
        self
    }

    /// Set the typewriter speed
    #[must_use]
    pub fn typewriter_speed(mut self, ms_per_char: u64) -> Self {
        self.typewriter_speed_ms = ms_per_char;
        self
    }

    /// Set the storage key
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// The base URL if it is present and non-blank
    #[must_use]
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check values that would make the widget misbehave
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the base URL is not an
    /// `http(s)` URL or the storage key is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = self.effective_base_url() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "base_url must start with http:// or https:// (got {url})"
                )));
            }
        }
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/chat-widget/widget.toml` or
/// `~/.config/chat-widget/widget.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("chat-widget").join("widget.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or the
/// resulting configuration is invalid. A missing config file is not an error.
pub fn load_config() -> Result<WidgetConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or the resulting configuration is invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<WidgetConfig, ConfigError> {
    let mut config = WidgetConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: WidgetConfigToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut WidgetConfig, toml: &WidgetConfigToml) {
    if toml.widget.base_url.is_some() {
        config.base_url = toml.widget.base_url.clone();
    }
    if let Some(ref key) = toml.widget.storage_key {
        config.storage_key = key.clone();
    }
    if toml.widget.welcome_message.is_some() {
        config.welcome_message = toml.widget.welcome_message.clone();
    }
    if let Some(speed) = toml.widget.typewriter_speed_ms {
        config.typewriter_speed_ms = speed;
    }
    if let Some(ref message) = toml.widget.empty_state_message {
        config.empty_state_message = message.clone();
    }
    if let Some(ref title) = toml.widget.title {
        config.title = title.clone();
    }
    if let Some(secs) = toml.http.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = toml.ui.modal_animation_ms {
        config.modal_animation = Duration::from_millis(ms);
    }
    if toml.storage.path.is_some() {
        config.storage_path = toml.storage.path.clone();
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut WidgetConfig) {
    if let Ok(url) = std::env::var("CHAT_WIDGET_BASE_URL") {
        config.base_url = Some(url);
        config.source = ConfigSource::Env;
    }
    if let Ok(key) = std::env::var("CHAT_WIDGET_STORAGE_KEY") {
        config.storage_key = key;
        config.source = ConfigSource::Env;
    }
    if let Ok(welcome) = std::env::var("CHAT_WIDGET_WELCOME") {
        config.welcome_message = Some(welcome);
        config.source = ConfigSource::Env;
    }
    if let Ok(speed) = std::env::var("CHAT_WIDGET_TYPEWRITER_SPEED") {
        if let Ok(ms) = speed.parse::<u64>() {
            config.typewriter_speed_ms = ms;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(message) = std::env::var("CHAT_WIDGET_EMPTY_STATE") {
        config.empty_state_message = message;
        config.source = ConfigSource::Env;
    }
    if let Ok(title) = std::env::var("CHAT_WIDGET_TITLE") {
        config.title = title;
        config.source = ConfigSource::Env;
    }
    if let Ok(timeout) = std::env::var("CHAT_WIDGET_REQUEST_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(animation) = std::env::var("CHAT_WIDGET_MODAL_ANIMATION_MS") {
        if let Ok(ms) = animation.parse::<u64>() {
            config.modal_animation = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(path) = std::env::var("CHAT_WIDGET_STORAGE_PATH") {
        config.storage_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Storage key override
    pub storage_key: Option<String>,

    /// Welcome message override
    pub welcome_message: Option<String>,

    /// Typewriter speed override
    pub typewriter_speed_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set storage key override
    #[must_use]
    pub fn with_storage_key(mut self, key: String) -> Self {
        self.storage_key = Some(key);
        self
    }

    /// Set welcome message override
    #[must_use]
    pub fn with_welcome_message(mut self, message: String) -> Self {
        self.welcome_message = Some(message);
        self
    }

    /// Set typewriter speed override
    #[must_use]
    pub fn with_typewriter_speed_ms(mut self, ms: u64) -> Self {
        self.typewriter_speed_ms = Some(ms);
        self
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.storage_key.is_none()
            && self.welcome_message.is_none()
            && self.typewriter_speed_ms.is_none()
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the overridden configuration is invalid.
    pub fn apply(&self, config: &mut WidgetConfig) -> Result<(), ConfigError> {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.base_url = Some(url.clone());
        }
        if let Some(ref key) = self.storage_key {
            config.storage_key = key.clone();
        }
        if let Some(ref message) = self.welcome_message {
            config.welcome_message = Some(message.clone());
        }
        if let Some(ms) = self.typewriter_speed_ms {
            config.typewriter_speed_ms = ms;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
