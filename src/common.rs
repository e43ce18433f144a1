use crate::config::Config;
use crate::routers::Router;
use anyhow::{Result, anyhow};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Clone, Default, Debug)]
pub struct CommonParams {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        help = "Path to the configuration file (defaults to the user config directory)"
    )]
    pub config: Option<PathBuf>,

    /// Override the default LLM router
    #[arg(long, help = "Override default LLM router", value_parser = available_routers_parser)]
    pub router: Option<String>,

    /// Model identifier for the selected router
    #[arg(
        short,
        long,
        help = "Model identifier for the selected router (defaults to config default_model)"
    )]
    pub model: Option<String>,
}

impl CommonParams {
    /// Resolve the router: command line first, then config, then the
    /// built-in default.
    pub fn resolve_router(&self, config: &Config) -> Result<Router> {
        let name = self
            .router
            .as_deref()
            .unwrap_or(&config.default_router);
        name.parse::<Router>().map_err(Into::into)
    }

    /// Resolve the model identifier: command line first, then config.
    /// Having no model anywhere is a fatal configuration error.
    pub fn resolve_model(&self, config: &Config) -> Result<String> {
        self.model
            .clone()
            .or_else(|| config.default_model.clone())
            .ok_or_else(|| {
                anyhow!("No model specified. Provide --model or default_model in the config file.")
            })
    }
}

/// Validates that a router name is available in the system
pub fn available_routers_parser(s: &str) -> Result<String, String> {
    match s.parse::<Router>() {
        Ok(router) => Ok(router.name().to_string()),
        Err(_) => Err(format!(
            "Invalid router '{}'. Available routers: {}",
            s,
            Router::all_names().join(", ")
        )),
    }
}
