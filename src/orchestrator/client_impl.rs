use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::client::{OrchestratorClient, ProcessRequest};
use crate::config::OrchestratorConfig;

pub struct HttpOrchestrator {
    base_url: String,
    health_timeout: Duration,
    forward_timeout: Duration,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(rename = "requestId", default)]
    request_id: Option<serde_json::Value>,
}

impl HttpOrchestrator {
    pub fn new(base_url: &str, health_timeout: Duration, forward_timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout,
            forward_timeout,
            client: Client::builder()
                .build()
                .context("failed to build HTTP client")?,
        })
    }

    pub fn from_config(config: &OrchestratorConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.health_timeout_secs),
            Duration::from_secs(config.forward_timeout_secs),
        )
    }
}

#[async_trait]
impl OrchestratorClient for HttpOrchestrator {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        debug!("Probing orchestrator health at {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
            .context("Failed to reach orchestrator health endpoint")?;

        Ok(response.status() == StatusCode::OK)
    }

    async fn submit(&self, request: &ProcessRequest) -> Result<Option<String>> {
        let url = format!("{}/process", self.base_url);
        debug!("Forwarding directive to {} (priority {})", url, request.priority);

        let response = self
            .client
            .post(&url)
            .timeout(self.forward_timeout)
            .json(request)
            .send()
            .await
            .context("Failed to send directive to orchestrator")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Orchestrator error {}: {}", status, error_text);
        }

        let body: ProcessResponse = response
            .json()
            .await
            .context("Failed to parse orchestrator response")?;

        Ok(body.request_id.and_then(|id| match id {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }))
    }
}
