use facette_ai::DeepSeekConfig;
use facette_core::{Catalog, CatalogError};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// AI provider settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one AI round trip, seconds.
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        let transport = DeepSeekConfig::default();
        Self {
            enabled: true,
            endpoint: transport.endpoint,
            api_key: String::new(),
            model: transport.model,
            temperature: transport.temperature,
            max_tokens: transport.max_tokens,
            timeout_secs: 10,
        }
    }
}

/// Analysis configuration: optional TOML file, then `FACETTE_*` environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiSettings,
    /// Product catalog file (TOML or JSON). The embedded catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Derive local-path tips from the classification instead of the fixed list.
    pub personalized_tips: bool,
}

impl Config {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    /// Load configuration from `FACETTE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Read `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => {
                let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::debug!(path = %path.display(), "config file read");
                Self::from_toml_str(&src)?
            }
            None => Self::default(),
        };
        Ok(base.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from a key lookup. Unparseable values keep the current setting.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ai = &mut self.ai;
        ai.enabled = env_bool(&lookup, "FACETTE_AI_ENABLED", ai.enabled);
        if let Some(v) = lookup("FACETTE_AI_ENDPOINT") {
            ai.endpoint = v;
        }
        if let Some(v) = lookup("FACETTE_AI_API_KEY") {
            ai.api_key = v;
        }
        if let Some(v) = lookup("FACETTE_AI_MODEL") {
            ai.model = v;
        }
        ai.temperature = env_f32(&lookup, "FACETTE_AI_TEMPERATURE", ai.temperature);
        ai.max_tokens = env_u32(&lookup, "FACETTE_AI_MAX_TOKENS", ai.max_tokens);
        ai.timeout_secs = env_u64(&lookup, "FACETTE_AI_TIMEOUT_SECS", ai.timeout_secs);

        if let Some(v) = lookup("FACETTE_CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(v));
        }
        self.personalized_tips = env_bool(&lookup, "FACETTE_PERSONALIZED_TIPS", self.personalized_tips);
        self
    }

    /// True when AI analysis is enabled and a key is present.
    pub fn ai_active(&self) -> bool {
        self.ai.enabled && !self.ai.api_key.trim().is_empty()
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai.timeout_secs)
    }

    /// Transport settings for the chat-completions client.
    pub fn deepseek(&self) -> DeepSeekConfig {
        DeepSeekConfig {
            endpoint: self.ai.endpoint.clone(),
            api_key: self.ai.api_key.clone(),
            model: self.ai.model.clone(),
            temperature: self.ai.temperature,
            max_tokens: self.ai.max_tokens,
            timeout: self.ai_timeout(),
        }
    }

    /// The configured catalog file, or the embedded catalog.
    pub fn catalog(&self) -> Result<Cow<'static, Catalog>, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path).map(Cow::Owned),
            None => Ok(Cow::Borrowed(Catalog::builtin())),
        }
    }
}

fn env_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        _ => default,
    }
}

fn env_f32(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f32) -> f32 {
    lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn env_u32(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn env_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
