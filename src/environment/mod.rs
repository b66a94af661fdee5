//! Environment snapshot: what the local project and machine look like at startup.
//!
//! Captured once per run and passed by reference to everything downstream.
//! Every check is best-effort; a failed check shows up as an empty list,
//! `None` container status or a missing endpoint, never as an error.

pub mod containers;
pub mod integrations;
pub mod project;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::orchestrator::OrchestratorClient;
pub use containers::ContainerStatus;
pub use project::ProjectFiles;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub integrations: Vec<String>,
    pub critical_files: Vec<String>,
    pub api_endpoints: Vec<String>,
    /// `None` when the container runtime could not be queried
    pub containers: Option<ContainerStatus>,
    /// Orchestrator base URL, present only when its health check passed
    pub orchestrator_endpoint: Option<String>,
}

impl EnvironmentSnapshot {
    pub fn orchestrator_running(&self) -> bool {
        self.containers.is_some_and(|c| c.orchestrator_running)
    }

    pub fn redis_running(&self) -> bool {
        self.containers.is_some_and(|c| c.redis_running)
    }

    pub fn api_healthy(&self) -> bool {
        self.orchestrator_endpoint.is_some()
    }
}

/// Capture the snapshot for the project at `root`.
pub async fn capture(
    root: &Path,
    config: &Config,
    orchestrator: &dyn OrchestratorClient,
) -> EnvironmentSnapshot {
    info!("Capturing environment for {}", root.display());

    let integrations = integrations::scan_integrations(
        root,
        &config.environment.env_files,
        &config.environment.markers,
    );
    let ProjectFiles {
        critical_files,
        api_endpoints,
    } = project::scan_project(root, &config.project);

    let orchestrator_config = config.orchestrator.clone();
    let containers =
        match tokio::task::spawn_blocking(move || containers::query_containers(&orchestrator_config))
            .await
        {
            Ok(status) => status,
            Err(e) => {
                debug!("Container query task failed: {}", e);
                None
            }
        };

    let orchestrator_endpoint = match orchestrator.health().await {
        Ok(true) => Some(orchestrator.base_url().to_string()),
        Ok(false) => {
            debug!("Orchestrator at {} is not healthy", orchestrator.base_url());
            None
        }
        Err(e) => {
            debug!("Orchestrator health check failed: {:#}", e);
            None
        }
    };

    info!(
        "Environment: {} integrations, {} critical files, {} API routes, orchestrator {}",
        integrations.len(),
        critical_files.len(),
        api_endpoints.len(),
        if orchestrator_endpoint.is_some() {
            "healthy"
        } else {
            "unavailable"
        }
    );

    EnvironmentSnapshot {
        integrations,
        critical_files,
        api_endpoints,
        containers,
        orchestrator_endpoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_flags() {
        let snapshot = EnvironmentSnapshot::default();
        assert!(!snapshot.orchestrator_running());
        assert!(!snapshot.redis_running());
        assert!(!snapshot.api_healthy());
    }

    #[test]
    fn test_flags_follow_container_status() {
        let snapshot = EnvironmentSnapshot {
            containers: Some(ContainerStatus {
                orchestrator_running: true,
                redis_running: false,
            }),
            orchestrator_endpoint: Some("http://localhost:3000".to_string()),
            ..EnvironmentSnapshot::default()
        };
        assert!(snapshot.orchestrator_running());
        assert!(!snapshot.redis_running());
        assert!(snapshot.api_healthy());
    }
}
