pub mod config;
pub mod serve;
pub mod timers;

use anyhow::{anyhow, Result};
use clap::Args;
use portier_core::config::{Config, Secret};
use std::path::Path;

/// Values that may come from the environment instead of the config file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Shared secret expected in the Authorization header
    #[arg(long, global = true, env = "PORTIER_AUTH_KEY", hide_env_values = true)]
    auth_key: Option<String>,

    /// Bearer token for the lock API
    #[arg(long, global = true, env = "PORTIER_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Lock id of the street door
    #[arg(long, global = true, env = "PORTIER_STREET_ID")]
    street_id: Option<String>,

    /// Lock id of the floor door
    #[arg(long, global = true, env = "PORTIER_FLOOR_ID")]
    floor_id: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(v) = &self.auth_key {
            config.auth_key = Secret::new(v.clone());
        }
        if let Some(v) = &self.api_token {
            config.api.token = Secret::new(v.clone());
        }
        if let Some(v) = &self.street_id {
            config.targets.street = v.clone();
        }
        if let Some(v) = &self.floor_id {
            config.targets.floor = v.clone();
        }
    }
}

/// Load the config file and layer environment/flag overrides on top.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<Config> {
    let mut config = Config::load(path).map_err(|e| anyhow!("{e} (run `portier config init`)"))?;
    overrides.apply(&mut config);
    Ok(config)
}
