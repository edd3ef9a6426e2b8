//! Outbound unlock calls.
//!
//! `ActionInvoker` is the seam between the scheduler/router and the physical
//! locks. Implementations never fail past their boundary: every outcome,
//! including timeouts and transport errors, comes back as an `ActionResult`.

use std::time::Duration;

use async_trait::async_trait;
use portier_core::config::{ApiConfig, Secret, TargetsConfig};
use portier_core::{ActionResult, PortierError, Target};
use reqwest::header::CONTENT_TYPE;

#[async_trait]
pub trait ActionInvoker: Send + Sync {
    async fn invoke(&self, target: Target) -> ActionResult;
}

// ---------------------------------------------------------------------------
// HttpInvoker
// ---------------------------------------------------------------------------

/// Unlocks by POSTing to `{base_url}/smartlock/{lock_id}/action/unlock`.
pub struct HttpInvoker {
    client: reqwest::Client,
    base_url: String,
    token: Secret,
    targets: TargetsConfig,
}

impl HttpInvoker {
    pub fn new(api: &ApiConfig, targets: &TargetsConfig) -> portier_core::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| PortierError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token: api.token.clone(),
            targets: targets.clone(),
        })
    }

    fn unlock_url(&self, target: Target) -> String {
        format!(
            "{}/smartlock/{}/action/unlock",
            self.base_url,
            self.targets.lock_id(target)
        )
    }
}

#[async_trait]
impl ActionInvoker for HttpInvoker {
    async fn invoke(&self, target: Target) -> ActionResult {
        let url = self.unlock_url(target);
        let sent = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await;

        match sent {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(door = %target, "door unlocked");
                ActionResult::ok(target, format!("{target} unlocked"))
            }
            Ok(resp) => {
                let status = resp.status();
                tracing::warn!(door = %target, %status, "lock api refused unlock");
                ActionResult::failed(target, format!("lock api returned {status}"))
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(door = %target, "lock api timed out");
                ActionResult::failed(target, "lock api timed out")
            }
            Err(e) => {
                tracing::warn!(door = %target, error = %e, "lock api unreachable");
                ActionResult::failed(target, "lock api unreachable")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
