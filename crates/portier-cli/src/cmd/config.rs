use crate::output::print_json;
use clap::Subcommand;
use portier_core::config::{Config, WarnLevel, SAMPLE_CONFIG};
use std::path::Path;

use super::{load_config, Overrides};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Write a starter config file (never overwrites)
    Init,

    /// Validate the config, including environment overrides
    Check,
}

pub fn run(
    path: &Path,
    overrides: &Overrides,
    subcmd: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Init => init(path, json),
        ConfigSubcommand::Check => check(path, overrides, json),
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(path: &Path, json: bool) -> anyhow::Result<()> {
    let written = portier_core::io::write_if_missing(path, SAMPLE_CONFIG.as_bytes())?;

    if json {
        print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "created": written,
        }))?;
    } else if written {
        println!("Created {}", path.display());
        println!("Set auth_key, api.token and the two lock ids, then run `portier config check`.");
    } else {
        println!("{} already exists; left unchanged.", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

fn check(path: &Path, overrides: &Overrides, json: bool) -> anyhow::Result<()> {
    let config = load_config(path, overrides)?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if Config::has_errors(&warnings) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
