use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;

/// Body of `POST /process`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: u32,
    pub context: ProcessContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessContext {
    pub compliance_score: u32,
    pub original_request: String,
}

impl ProcessRequest {
    pub fn analyze(prompt: &str, priority: u32, compliance_score: u32, original: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            kind: "analyze".to_string(),
            priority,
            context: ProcessContext {
                compliance_score,
                original_request: original.to_string(),
            },
        }
    }
}

#[async_trait]
pub trait OrchestratorClient: Send + Sync {
    /// Base URL reported as the endpoint when the service is healthy
    fn base_url(&self) -> &str;

    /// `Ok(true)` only when the health endpoint answered 200
    async fn health(&self) -> Result<bool>;

    /// Submit a directive; returns the request id the service assigned, if any
    async fn submit(&self, request: &ProcessRequest) -> Result<Option<String>>;
}

/// Client used with `--offline`: never reachable, never sends anything.
pub struct OfflineOrchestrator;

impl Default for OfflineOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineOrchestrator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrchestratorClient for OfflineOrchestrator {
    fn base_url(&self) -> &str {
        ""
    }

    async fn health(&self) -> Result<bool> {
        Ok(false)
    }

    async fn submit(&self, _request: &ProcessRequest) -> Result<Option<String>> {
        bail!("orchestrator is offline")
    }
}
