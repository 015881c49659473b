use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{LeadChatError, Result};

/// How user messages reach the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// `POST /v1/message`, one JSON reply
    SingleShot,
    /// `POST /v1/message/stream`, SSE frames
    Streaming,
    /// `POST /v1/chat`, answer and sources only
    Legacy,
}

impl DispatchMode {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "single_shot" | "single" => Some(Self::SingleShot),
            "streaming" | "stream" => Some(Self::Streaming),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

/// Where lead fields are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStrategy {
    Backend,
    Regex,
}

impl ValidationStrategy {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "backend" | "remote" => Some(Self::Backend),
            "regex" | "local" => Some(Self::Regex),
            _ => None,
        }
    }
}

/// Client-side configuration for the chat widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Origin the `/v1/*` paths are resolved against
    pub base_url: String,
    /// Lead endpoint; `/form-schema` and `/validate` hang off it
    pub lead_endpoint: String,
    /// Hard cap on any single HTTP exchange, independent of the chat timeout
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub dispatch_mode: DispatchMode,
    pub validation: ValidationStrategy,
    pub show_sources: bool,
    /// Answer sub-service, services-list and pricing intents locally
    pub local_intents: bool,
    #[serde(default)]
    pub developer_context: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                lead_endpoint: "/submit-lead".to_string(),
                http_timeout_secs: 30,
            },
            widget: WidgetConfig {
                dispatch_mode: DispatchMode::Streaming,
                validation: ValidationStrategy::Backend,
                show_sources: false,
                local_intents: true,
                developer_context: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded .env from: {}", path.display()),
            Err(_) => tracing::debug!("No .env file found - continuing with env vars only"),
        }

        let config_path =
            env::var("LEAD_CHAT_CONFIG_PATH").unwrap_or_else(|_| "lead-chat.yaml".to_string());

        let mut config = Self::from_file(Path::new(&config_path));
        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Read a YAML config file, falling back to defaults when it is missing
    /// or unreadable.
    pub fn from_file(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Config file not found at {} - using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to parse config file {}: {} - using defaults",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!(
                    "Failed to read config file {}: {} - using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Backend overrides
        if let Some(url) = var("LEAD_CHAT_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Some(endpoint) = var("LEAD_CHAT_LEAD_ENDPOINT") {
            self.backend.lead_endpoint = endpoint;
        }
        if let Some(secs) = var("LEAD_CHAT_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.backend.http_timeout_secs = secs;
            }
        }

        // Widget overrides
        if let Some(mode) = var("LEAD_CHAT_DISPATCH_MODE") {
            match DispatchMode::from_string(&mode) {
                Some(mode) => self.widget.dispatch_mode = mode,
                None => tracing::warn!("Unknown dispatch mode '{}', keeping current", mode),
            }
        }
        if let Some(strategy) = var("LEAD_CHAT_VALIDATION") {
            match ValidationStrategy::from_string(&strategy) {
                Some(strategy) => self.widget.validation = strategy,
                None => tracing::warn!("Unknown validation strategy '{}', keeping current", strategy),
            }
        }
        if let Some(flag) = var("LEAD_CHAT_SHOW_SOURCES") {
            if let Ok(flag) = flag.parse() {
                self.widget.show_sources = flag;
            }
        }
        if let Some(flag) = var("LEAD_CHAT_LOCAL_INTENTS") {
            if let Ok(flag) = flag.parse() {
                self.widget.local_intents = flag;
            }
        }
        if let Some(ctx) = var("LEAD_CHAT_DEVELOPER_CONTEXT") {
            self.widget.developer_context = Some(ctx);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(LeadChatError::Config(format!(
                "backend.base_url must be an http(s) URL, got '{}'",
                self.backend.base_url
            )));
        }
        if !self.backend.lead_endpoint.starts_with('/') {
            return Err(LeadChatError::Config(
                "backend.lead_endpoint must start with '/'".to_string(),
            ));
        }
        if self.backend.http_timeout_secs == 0 {
            return Err(LeadChatError::Config(
                "backend.http_timeout_secs cannot be 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.http_timeout_secs)
    }
}
