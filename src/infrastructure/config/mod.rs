//! Configuration management
//!
//! Secrets come from the environment only. Everything else has a default and
//! may be overridden by a YAML file and a few environment variables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::domain::entities::Species;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub idt: IdtConfig,
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub command: String,
    pub default_species: Species,
}

/// How the bot obtains a vendor access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrantType {
    #[default]
    ClientCredentials,
    Password,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IdtConfig {
    pub base_url: String,
    pub token_path: String,
    pub api_path: String,
    pub scope: String,
    pub grant: GrantType,
    pub result_count: u32,
    pub timeout_seconds: u64,
    pub refresh_margin_seconds: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SlackConfig {
    pub api_base: String,
    pub reconnect_delay_seconds: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "crispr-bot".to_string(),
            command: "/crispr".to_string(),
            default_species: Species::Human,
        }
    }
}

impl Default for IdtConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.idtdna.com".to_string(),
            token_path: "/Identityserver/connect/token".to_string(),
            api_path: "/restapi/v1".to_string(),
            scope: "test".to_string(),
            grant: GrantType::ClientCredentials,
            result_count: 5,
            timeout_seconds: 30,
            refresh_margin_seconds: 60,
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: "https://slack.com/api".to_string(),
            reconnect_delay_seconds: 5,
        }
    }
}

impl IdtConfig {
    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.token_path)
    }

    /// Full URL of a CRISPR design endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}{}/CRISPR/Design/{}",
            self.base_url.trim_end_matches('/'),
            self.api_path,
            endpoint
        )
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config {}: {}", path.display(), e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, then apply environment overrides
    pub fn load_or_default(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut config = if path.exists() {
            Self::load(&path)?
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("IDT_BASE_URL") {
            self.idt.base_url = url;
        }

        if let Ok(url) = std::env::var("SLACK_API_BASE") {
            self.slack.api_base = url;
        }

        if let Ok(name) = std::env::var("CRISPR_DEFAULT_SPECIES") {
            self.bot.default_species = Species::parse(&name)
                .ok_or_else(|| ConfigError::InvalidValue(format!("CRISPR_DEFAULT_SPECIES={}", name)))?;
        }

        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.idt.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue("idt.timeout-seconds must be positive".to_string()));
        }
        if self.idt.refresh_margin_seconds < 0 {
            return Err(ConfigError::InvalidValue("idt.refresh-margin-seconds must not be negative".to_string()));
        }
        if self.idt.result_count == 0 {
            return Err(ConfigError::InvalidValue("idt.result-count must be positive".to_string()));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

pub const REQUIRED_ENV: [&str; 6] = [
    "SLACK_BOT_TOKEN",
    "SLACK_APP_TOKEN",
    "IDT_CLIENT_ID",
    "IDT_CLIENT_SECRET",
    "IDT_USERNAME",
    "IDT_PASSWORD",
];

/// Static secrets, read once at startup
#[derive(Clone)]
pub struct Credentials {
    pub slack_bot_token: String,
    pub slack_app_token: String,
    pub idt_client_id: String,
    pub idt_client_secret: String,
    pub idt_username: String,
    pub idt_password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Missing or empty values are collected
    /// and reported together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut values = Vec::with_capacity(REQUIRED_ENV.len());
        for name in REQUIRED_ENV {
            match lookup(name).filter(|v| !v.trim().is_empty()) {
                Some(value) => values.push(value),
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing));
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        Ok(Self {
            slack_bot_token: next(),
            slack_app_token: next(),
            idt_client_id: next(),
            idt_client_secret: next(),
            idt_username: next(),
            idt_password: next(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("slack_bot_token", &"<redacted>")
            .field("slack_app_token", &"<redacted>")
            .field("idt_client_id", &self.idt_client_id)
            .field("idt_client_secret", &"<redacted>")
            .field("idt_username", &self.idt_username)
            .field("idt_password", &"<redacted>")
            .finish()
    }
}
