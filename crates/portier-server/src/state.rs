use std::sync::Arc;

use portier_core::config::Config;
use portier_core::{Target, TimerStore};

use crate::invoker::{ActionInvoker, HttpInvoker};
use crate::scheduler::DelayedActionScheduler;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub invoker: Arc<dyn ActionInvoker>,
    pub scheduler: DelayedActionScheduler,
}

impl AppState {
    /// Wire the components together. The scheduler fires the floor lock.
    pub fn new(config: Config, invoker: Arc<dyn ActionInvoker>, store: Arc<dyn TimerStore>) -> Self {
        let scheduler = DelayedActionScheduler::new(
            store,
            Arc::clone(&invoker),
            config.delay.clone(),
            config.scheduler.clone(),
            Target::Floor,
        );
        Self {
            config: Arc::new(config),
            invoker,
            scheduler,
        }
    }

    /// State backed by the real lock API.
    pub fn with_http_invoker(config: Config, store: Arc<dyn TimerStore>) -> portier_core::Result<Self> {
        let invoker = HttpInvoker::new(&config.api, &config.targets)?;
        Ok(Self::new(config, Arc::new(invoker), store))
    }
}
