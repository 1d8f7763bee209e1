use crate::db::Store;
use crate::hooks::{HookDispatcher, HookError, HookEvent};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Serialize)]
struct HookEnvelope<'a> {
    event: &'static str,
    payload: &'a serde_json::Value,
    timestamp: String,
}

/// Posts hook envelopes to the URL configured for each event.
///
/// Events without a URL are accepted without any request.
pub struct HttpDispatcher {
    client: Client,
    store: Arc<Store>,
}

impl HttpDispatcher {
    #[must_use]
    pub fn new(store: Arc<Store>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("Showkeeper/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            store,
        }
    }

    async fn deliver(
        &self,
        event: HookEvent,
        payload: &serde_json::Value,
    ) -> Result<bool, HookError> {
        let url = self
            .store
            .hook_url(event.as_str())
            .await
            .map_err(|e| HookError::Store(e.to_string()))?;

        if url.is_empty() {
            return Ok(false);
        }

        let envelope = HookEnvelope {
            event: event.as_str(),
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let response = self
            .client
            .post(&url)
            .header("X-Hook-Event", event.as_str())
            .json(&envelope)
            .send()
            .await
            .map_err(|e| HookError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HookError::Status(status.as_u16()));
        }

        debug!(event = %event, status = status.as_u16(), "Hook delivered");
        Ok(true)
    }

    async fn deliver_recorded(
        &self,
        event: HookEvent,
        payload: &serde_json::Value,
    ) -> Result<(), HookError> {
        let result = self.deliver(event, payload).await;
        let outcome = match &result {
            Ok(true) => "delivered",
            Ok(false) => "skipped",
            Err(_) => "failed",
        };
        metrics::counter!("hook_dispatch_total", "event" => event.as_str(), "outcome" => outcome)
            .increment(1);
        result.map(|_| ())
    }
}

#[async_trait]
impl HookDispatcher for HttpDispatcher {
    async fn dispatch_pre(
        &self,
        event: HookEvent,
        payload: &serde_json::Value,
    ) -> Result<(), HookError> {
        self.deliver_recorded(event, payload).await
    }

    async fn dispatch_post(&self, event: HookEvent, payload: &serde_json::Value) {
        if let Err(e) = self.deliver_recorded(event, payload).await {
            warn!(event = %event, error = %e, "Post-hook delivery failed");
        }
    }
}
