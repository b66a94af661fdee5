use serde::{Deserialize, Serialize};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

use crate::config::OrchestratorConfig;
use crate::util::run_cmd_with_timeout;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub orchestrator_running: bool,
    pub redis_running: bool,
}

/// Ask the container runtime which orchestrator containers are up.
///
/// Returns `None` when the runtime is missing, times out or exits non-zero.
pub fn query_containers(config: &OrchestratorConfig) -> Option<ContainerStatus> {
    let mut cmd = Command::new(&config.runtime);
    cmd.args(["ps", "--filter"])
        .arg(format!("name={}", config.container_filter));

    let output = match run_cmd_with_timeout(cmd, Duration::from_secs(config.process_timeout_secs))
    {
        Ok(output) => output,
        Err(e) => {
            debug!("Container query via {} failed: {:#}", config.runtime, e);
            return None;
        }
    };

    if !output.status.success() {
        debug!(
            "Container query exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(parse_container_list(
        &stdout,
        &config.main_container,
        &config.redis_container,
    ))
}

pub fn parse_container_list(stdout: &str, main: &str, redis: &str) -> ContainerStatus {
    ContainerStatus {
        orchestrator_running: stdout.contains(main),
        redis_running: stdout.contains(redis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS_OUTPUT: &str = "\
CONTAINER ID   IMAGE          COMMAND                  STATUS         NAMES
1f2e3d4c5b6a   claude:latest  \"node server.js\"         Up 2 hours     claude-main
6a5b4c3d2e1f   redis:7        \"docker-entrypoint.s…\"   Up 2 hours     claude-redis
";

    #[test]
    fn test_parse_both_running() {
        let status = parse_container_list(PS_OUTPUT, "claude-main", "claude-redis");
        assert!(status.orchestrator_running);
        assert!(status.redis_running);
    }

    #[test]
    fn test_parse_header_only() {
        let status = parse_container_list(
            "CONTAINER ID   IMAGE   COMMAND   STATUS   NAMES\n",
            "claude-main",
            "claude-redis",
        );
        assert_eq!(status, ContainerStatus::default());
    }

    #[test]
    fn test_missing_runtime_is_none() {
        let config = OrchestratorConfig {
            runtime: "enhance-prompt-missing-runtime".to_string(),
            ..OrchestratorConfig::default()
        };
        assert!(query_containers(&config).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_runtime_output_is_parsed() {
        // `echo ps --filter name=claude-main` prints its arguments back
        let config = OrchestratorConfig {
            runtime: "echo".to_string(),
            container_filter: "claude-main".to_string(),
            ..OrchestratorConfig::default()
        };
        let status = query_containers(&config).unwrap();
        assert!(status.orchestrator_running);
        assert!(!status.redis_running);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_runtime_is_none() {
        let config = OrchestratorConfig {
            runtime: "false".to_string(),
            ..OrchestratorConfig::default()
        };
        assert!(query_containers(&config).is_none());
    }
}
