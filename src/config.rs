use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::ai::prompts;
use crate::constants::{
    AI_TIMEOUT_SECS, DEFAULT_AI_BASE_URL, DEFAULT_AI_MAX_TOKENS, DEFAULT_AI_MODEL,
    DEFAULT_RUN_TIME, DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER, DEFAULT_TIMEZONE, DIGEST_SUBJECT,
    POLL_INTERVAL_SECS, SMTP_TIMEOUT_SECS,
};
use crate::digest::TopicRequest;

pub const ENV_CONFIG_PATH: &str = "JOBDIGEST_CONFIG";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_SENDER: &str = "EMAIL_SENDER";
pub const ENV_PASSWORD: &str = "EMAIL_PASSWORD";

/// Process-wide configuration, resolved once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Chat-completion backend
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Digest topics, run in order on every tick
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            ai: AiConfig::default(),
            smtp: SmtpConfig::default(),
            topics: default_topics(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local run time, `HH:MM`
    #[serde(default = "default_run_time")]
    pub time: String,
    /// IANA zone name the run time is interpreted in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            time: default_run_time(),
            timezone: default_timezone(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key; usually supplied through `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            max_tokens: default_ai_max_tokens(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_server")]
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Sender address, also used as the SMTP username
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: default_smtp_server(),
            port: default_smtp_port(),
            sender: None,
            password: None,
            timeout_secs: default_smtp_timeout_secs(),
            subject: default_subject(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    pub prompt: String,
    #[serde(default)]
    pub recipient: Option<String>,
    /// Environment variable holding the recipient; wins over `recipient` when set
    #[serde(default)]
    pub recipient_env: Option<String>,
}

impl TopicConfig {
    fn from_env(name: &str, prompt: &str, recipient_env: &str) -> Self {
        Self {
            name: name.to_string(),
            prompt: prompt.to_string(),
            recipient: None,
            recipient_env: Some(recipient_env.to_string()),
        }
    }
}

fn default_topics() -> Vec<TopicConfig> {
    vec![
        TopicConfig::from_env(
            "data-science-energy",
            prompts::DATA_SCIENCE_ENERGY,
            "DATA_SCIENCE_RECIPIENT",
        ),
        TopicConfig::from_env("chemistry", prompts::CHEMISTRY, "CHEMISTRY_RECIPIENT"),
    ]
}

fn default_run_time() -> String {
    DEFAULT_RUN_TIME.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_poll_interval_secs() -> u64 {
    POLL_INTERVAL_SECS
}

fn default_ai_base_url() -> String {
    DEFAULT_AI_BASE_URL.to_string()
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

fn default_ai_max_tokens() -> u32 {
    DEFAULT_AI_MAX_TOKENS
}

fn default_ai_timeout_secs() -> u64 {
    AI_TIMEOUT_SECS
}

fn default_smtp_server() -> String {
    DEFAULT_SMTP_SERVER.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_smtp_timeout_secs() -> u64 {
    SMTP_TIMEOUT_SECS
}

fn default_subject() -> String {
    DIGEST_SUBJECT.to_string()
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("jobdigest");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(ENV_CONFIG_PATH) {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load `.env`, then the optional config file, then apply environment overrides.
    ///
    /// Missing credentials are not an error here; they surface on first use.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv_override() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        }

        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            tracing::info!("Using config file {}", path.display());
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_env(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()));
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay credentials and recipients from the environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.ai.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.ai.base_url = url;
        }
        if let Some(sender) = lookup(ENV_SENDER) {
            self.smtp.sender = Some(sender);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.smtp.password = Some(password);
        }
        for topic in &mut self.topics {
            if let Some(recipient) = topic.recipient_env.as_deref().and_then(&lookup) {
                topic.recipient = Some(recipient);
            }
        }
    }

    pub fn topic_requests(&self) -> Vec<TopicRequest> {
        self.topics
            .iter()
            .map(|t| TopicRequest {
                name: t.name.clone(),
                prompt: t.prompt.clone(),
                recipient: t.recipient.clone(),
            })
            .collect()
    }
}
