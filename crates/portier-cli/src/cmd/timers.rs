use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use portier_core::{ScheduleKey, TimerDb, TimerStore};
use std::path::Path;

use super::{load_config, Overrides};

#[derive(Subcommand)]
pub enum TimersSubcommand {
    /// List pending delayed unlocks, soonest first
    List,

    /// Drop the pending unlock for a key without firing it
    Cancel {
        /// Request path the timer was armed under, e.g. /front
        key: String,
    },
}

pub fn run(
    path: &Path,
    overrides: &Overrides,
    subcmd: TimersSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(path, overrides)?;
    let store_path = config.resolved_store_path(path);
    let db = TimerDb::open(&store_path)
        .with_context(|| format!("cannot open timer store {} (is the server running?)", store_path.display()))?;

    match subcmd {
        TimersSubcommand::List => list(&db, json),
        TimersSubcommand::Cancel { key } => cancel(&db, &key, json),
    }
}

fn list(db: &TimerDb, json: bool) -> anyhow::Result<()> {
    let timers = db.list()?;

    if json {
        return print_json(&timers);
    }
    if timers.is_empty() {
        println!("No pending timers.");
        return Ok(());
    }

    let now = Utc::now();
    let rows = timers
        .iter()
        .map(|t| {
            let fires_at = t
                .fire_at()
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string());
            let remaining = t.remaining_ms(now).div_ceil(1000);
            vec![
                t.key.to_string(),
                t.target.to_string(),
                fires_at,
                format!("{remaining}s"),
            ]
        })
        .collect();
    print_table(&["KEY", "DOOR", "FIRES AT", "IN"], rows);
    Ok(())
}

fn cancel(db: &TimerDb, raw: &str, json: bool) -> anyhow::Result<()> {
    let key = ScheduleKey::from_path(raw)?;
    let removed = db.remove(&key)?;

    if json {
        return print_json(&serde_json::json!({
            "key": key.as_str(),
            "cancelled": removed,
        }));
    }
    if removed {
        println!("Cancelled timer for {key}");
    } else {
        println!("No pending timer for {key}");
    }
    Ok(())
}
