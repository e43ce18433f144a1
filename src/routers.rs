//! LLM router configuration.
//!
//! Single source of truth for supported backends and their endpoints.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::Config;

/// Supported OpenAI-compatible routers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Router {
    #[default]
    OpenRouter,
    DeepSeek,
}

impl Router {
    /// All available routers
    pub const ALL: &'static [Router] = &[Router::OpenRouter, Router::DeepSeek];

    /// Router name as used in config files and CLI
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::DeepSeek => "deepseek",
        }
    }

    /// Base URL of the chat-completion endpoint
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::DeepSeek => "https://api.deepseek.com/v1",
        }
    }

    /// Environment variable name for the API key
    pub const fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Get all router names as strings
    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::name).collect()
    }
}

impl FromStr for Router {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .find(|r| r.name() == lower)
            .copied()
            .ok_or_else(|| RouterError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Router configuration error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Unknown router: {0}. Supported: openrouter, deepseek")]
    Unknown(String),
}

/// Resolved endpoint settings for one router.
///
/// Built from the static tables above, with optional per-router
/// overrides from the config file applied on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Base URL of the chat-completion endpoint
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Extra headers sent with every request
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub default_headers: HashMap<String, String>,
}

impl RouterSettings {
    /// Settings for a router with its built-in defaults
    pub fn defaults_for(router: Router) -> Self {
        Self {
            base_url: router.base_url().to_string(),
            api_key_env: router.api_key_env().to_string(),
            default_headers: HashMap::new(),
        }
    }

    /// Settings for a router with any config-file overrides applied
    pub fn for_router(router: Router, config: &Config) -> Self {
        let mut settings = Self::defaults_for(router);
        if let Some(overrides) = config.routers.get(router.name()) {
            if let Some(base_url) = &overrides.base_url {
                settings.base_url.clone_from(base_url);
            }
            settings
                .default_headers
                .extend(overrides.default_headers.clone());
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_from_str() {
        assert_eq!("openrouter".parse::<Router>().ok(), Some(Router::OpenRouter));
        assert_eq!("DeepSeek".parse::<Router>().ok(), Some(Router::DeepSeek));
        assert!("invalid".parse::<Router>().is_err());
    }

    #[test]
    fn test_router_defaults() {
        assert_eq!(Router::OpenRouter.base_url(), "https://openrouter.ai/api/v1");
        assert_eq!(Router::DeepSeek.api_key_env(), "DEEPSEEK_API_KEY");
        assert_eq!(Router::all_names(), vec!["openrouter", "deepseek"]);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = RouterSettings::defaults_for(Router::DeepSeek);
        assert_eq!(settings.base_url, "https://api.deepseek.com/v1");
        assert!(settings.default_headers.is_empty());
    }
}
