use crate::log_debug;

use anyhow::{Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration structure for the Text2SQL harness
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    /// Default model identifier sent to the router
    #[serde(default)]
    pub default_model: Option<String>,
    /// Default router to target when none is given on the command line
    #[serde(default = "default_router")]
    pub default_router: String,
    /// Root directory of the Spider dataset
    #[serde(default = "default_spider_path")]
    pub spider_path: PathBuf,
    /// Name of the JSON file with Spider examples
    #[serde(default = "default_dev_filename")]
    pub dev_filename: String,
    /// Name of the JSON file describing schema metadata
    #[serde(default = "default_tables_filename")]
    pub tables_filename: String,
    /// Name of the gold SQL file used by the external evaluator
    #[serde(default = "default_gold_sql_filename")]
    pub gold_sql_filename: String,
    /// Directory of SQLite databases, relative to `spider_path`
    #[serde(default = "default_database_dir")]
    pub database_dir: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Per-router endpoint overrides
    #[serde(default)]
    pub routers: HashMap<String, RouterOverrides>,
}

/// Optional per-router configuration overrides
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct RouterOverrides {
    /// Replacement base URL for the router endpoint
    pub base_url: Option<String>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

fn default_router() -> String {
    "openrouter".to_string()
}

fn default_spider_path() -> PathBuf {
    PathBuf::from("spider_data")
}

fn default_dev_filename() -> String {
    "dev.json".to_string()
}

fn default_tables_filename() -> String {
    "tables.json".to_string()
}

fn default_gold_sql_filename() -> String {
    "dev_gold.sql".to_string()
}

fn default_database_dir() -> String {
    "database".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Config {
    /// Load the configuration, preferring an explicit path over the
    /// default location. A missing default file yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path()?,
        };

        let config = if config_path.exists() {
            let config_content = fs::read_to_string(&config_path)?;
            toml::from_str(&config_content).map_err(|e| {
                anyhow!("Invalid configuration file {}: {e}", config_path.display())
            })?
        } else if path.is_some() {
            // An explicitly named config file must exist
            return Err(anyhow!(
                "Configuration file not found: {}",
                config_path.display()
            ));
        } else {
            Self::default()
        };

        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Save the configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        let config_content = toml::to_string(self)?;
        fs::write(config_path, config_content)?;
        log_debug!("Configuration saved: {:?}", self);
        Ok(())
    }

    /// Get the path to the configuration file
    fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("text2sql");
        std::fs::create_dir_all(&path)?;
        path.push("config.toml");
        Ok(path)
    }

    /// Path to the Spider dev set
    pub fn dev_path(&self) -> PathBuf {
        self.spider_path.join(&self.dev_filename)
    }

    /// Path to the Spider schema metadata
    pub fn tables_path(&self) -> PathBuf {
        self.spider_path.join(&self.tables_filename)
    }

    /// Path to the gold SQL file
    pub fn gold_sql_path(&self) -> PathBuf {
        self.spider_path.join(&self.gold_sql_filename)
    }

    /// Path to the SQLite database directory
    pub fn database_path(&self) -> PathBuf {
        self.spider_path.join(&self.database_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: None,
            default_router: default_router(),
            spider_path: default_spider_path(),
            dev_filename: default_dev_filename(),
            tables_filename: default_tables_filename(),
            gold_sql_filename: default_gold_sql_filename(),
            database_dir: default_database_dir(),
            timeout_seconds: default_timeout_seconds(),
            routers: HashMap::new(),
        }
    }
}
