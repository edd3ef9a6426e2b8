use anyhow::{anyhow, bail, Result};
use portier_core::config::{Config, WarnLevel};
use portier_core::{MemoryTimerStore, TimerDb, TimerStore};
use std::path::Path;
use std::sync::Arc;

use super::{load_config, Overrides};

pub fn run(
    config_path: &Path,
    overrides: &Overrides,
    listen: Option<String>,
    ephemeral: bool,
) -> Result<()> {
    let mut config = load_config(config_path, overrides)?;
    if let Some(addr) = listen {
        config.listen = addr;
    }

    let warnings = config.validate();
    for w in &warnings {
        match w.level {
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
            WarnLevel::Error => tracing::error!("config: {}", w.message),
        }
    }
    if Config::has_errors(&warnings) {
        bail!("config has errors; run `portier config check` for details");
    }

    let store: Arc<dyn TimerStore> = if ephemeral {
        tracing::warn!("ephemeral mode: pending timers are lost on restart");
        Arc::new(MemoryTimerStore::new())
    } else {
        let path = config.resolved_store_path(config_path);
        let db = TimerDb::open(&path)
            .map_err(|e| anyhow!("cannot open timer store {}: {e}", path.display()))?;
        Arc::new(db)
    };

    let addr = config.listen_addr()?;
    let state = portier_server::AppState::with_http_invoker(config, store)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let actual = listener.local_addr()?;
        println!("portier listening on http://{actual}");

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        };
        portier_server::serve_on(state, listener, shutdown).await
    })
}
