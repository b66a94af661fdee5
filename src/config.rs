use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name looked up in the working directory before the user config dir.
pub const LOCAL_CONFIG_FILE: &str = "enhance-prompt.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// A substring to look for in env files and the label reported when it is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationMarker {
    pub marker: String,
    pub label: String,
}

impl IntegrationMarker {
    fn new(marker: &str, label: &str) -> Self {
        Self {
            marker: marker.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Env files scanned for markers, relative to the project root
    #[serde(default = "default_env_files")]
    pub env_files: Vec<String>,

    /// Checked in order; labels are reported in this order
    #[serde(default = "default_markers")]
    pub markers: Vec<IntegrationMarker>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            env_files: default_env_files(),
            markers: default_markers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project_type")]
    pub project_type: String,
    #[serde(default = "default_security_level")]
    pub security_level: String,
    #[serde(default = "default_deployment_target")]
    pub deployment_target: String,

    /// Files whose presence is reported in the directive
    #[serde(default = "default_critical_paths")]
    pub critical_paths: Vec<String>,

    /// Directory walked for API route files
    #[serde(default = "default_api_dir")]
    pub api_dir: String,

    /// Extensions (without the dot) collected from `api_dir`
    #[serde(default = "default_api_extensions")]
    pub api_extensions: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_type: default_project_type(),
            security_level: default_security_level(),
            deployment_target: default_deployment_target(),
            critical_paths: default_critical_paths(),
            api_dir: default_api_dir(),
            api_extensions: default_api_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Base URL of the local orchestrator service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Container runtime used for the process-list query (default: "docker")
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Name filter passed to `<runtime> ps --filter name=...`
    #[serde(default = "default_container_filter")]
    pub container_filter: String,

    #[serde(default = "default_main_container")]
    pub main_container: String,

    #[serde(default = "default_redis_container")]
    pub redis_container: String,

    /// Timeout for the process-list query in seconds
    #[serde(default = "default_process_timeout")]
    pub process_timeout_secs: u64,

    /// Timeout for `GET /health` in seconds
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,

    /// Timeout for `POST /process` in seconds
    #[serde(default = "default_forward_timeout")]
    pub forward_timeout_secs: u64,

    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Forward the directive when the orchestrator is healthy (default: true)
    #[serde(default = "default_true")]
    pub forward: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            runtime: default_runtime(),
            container_filter: default_container_filter(),
            main_container: default_main_container(),
            redis_container: default_redis_container(),
            process_timeout_secs: default_process_timeout(),
            health_timeout_secs: default_health_timeout(),
            forward_timeout_secs: default_forward_timeout(),
            priority: default_priority(),
            forward: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Artifact directory, relative to the project root unless absolute
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Persist each result as a timestamped JSON file (default: true)
    #[serde(default = "default_true")]
    pub save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            save: true,
        }
    }
}

fn default_env_files() -> Vec<String> {
    [".env", ".env.local", ".env.docker"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_markers() -> Vec<IntegrationMarker> {
    vec![
        IntegrationMarker::new("ELEVENLABS", "ElevenLabs Voice API (Pitch Narration)"),
        IntegrationMarker::new("ANTHROPIC", "Anthropic Claude API (Content Generation)"),
        IntegrationMarker::new("OPENROUTER", "OpenRouter API (Model Access)"),
        IntegrationMarker::new("SUPABASE", "Supabase (Database)"),
        IntegrationMarker::new("NEXTAUTH", "NextAuth (Authentication)"),
    ]
}

fn default_project_type() -> String {
    "Real Data Investor Pitch Deck Website - Disaster Recovery Australia".to_string()
}

fn default_security_level() -> String {
    "Production Grade - Vercel Deployment".to_string()
}

fn default_deployment_target() -> String {
    "https://disaster-recovery.vercel.app".to_string()
}

fn default_critical_paths() -> Vec<String> {
    [
        "src/app/pitch/page.tsx",
        "src/app/api/elevenlabs/narrate/route.ts",
        "src/data/realistic-financial-projections.ts",
        "docker-compose.claude-simple.yml",
        ".env.local",
        "vercel.json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_api_dir() -> String {
    "src/app/api".to_string()
}

fn default_api_extensions() -> Vec<String> {
    vec!["ts".to_string(), "tsx".to_string()]
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_runtime() -> String {
    "docker".to_string()
}

fn default_container_filter() -> String {
    "claude".to_string()
}

fn default_main_container() -> String {
    "claude-main".to_string()
}

fn default_redis_container() -> String {
    "claude-redis".to_string()
}

fn default_process_timeout() -> u64 {
    5
}

fn default_health_timeout() -> u64 {
    2
}

fn default_forward_timeout() -> u64 {
    30
}

fn default_priority() -> u32 {
    10
}

fn default_cache_dir() -> String {
    ".claude/cache".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        // An explicit path must load; a broken file there is a user error
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path)
                .with_context(|| format!("Failed to load config from {}", config_path));
        }

        if let Ok(config) = Self::load_from_path(LOCAL_CONFIG_FILE) {
            debug!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
            return Ok(config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("enhance-prompt").join("config.toml");
            if let Ok(config) = Self::load_from_path(&config_path) {
                debug!("Loaded config from {:?}", config_path);
                return Ok(config);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.environment.env_files.len(), 3);
        assert_eq!(config.environment.markers.len(), 5);
        assert_eq!(config.project.critical_paths.len(), 6);
        assert_eq!(config.orchestrator.base_url, "http://localhost:3000");
        assert_eq!(config.orchestrator.health_timeout_secs, 2);
        assert_eq!(config.orchestrator.priority, 10);
        assert!(config.orchestrator.forward);
        assert!(config.output.save);
        assert_eq!(config.output.cache_dir, ".claude/cache");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("base_url = \"http://localhost:3000\""));
        assert!(toml_str.contains("ELEVENLABS"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[orchestrator]
base_url = "http://127.0.0.1:9000"
priority = 3

[project]
api_dir = "app/api"
"#,
        )
        .unwrap();
        assert_eq!(config.orchestrator.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.orchestrator.priority, 3);
        assert_eq!(config.orchestrator.forward_timeout_secs, 30);
        assert_eq!(config.project.api_dir, "app/api");
        assert_eq!(config.project.api_extensions, vec!["ts", "tsx"]);
        assert_eq!(config.environment.env_files[0], ".env");
    }

    #[test]
    fn test_custom_markers() {
        let config: Config = toml::from_str(
            r#"
[[environment.markers]]
marker = "STRIPE"
label = "Stripe (Payments)"
"#,
        )
        .unwrap();
        assert_eq!(
            config.environment.markers,
            vec![IntegrationMarker::new("STRIPE", "Stripe (Payments)")]
        );
    }

    #[test]
    fn test_load_with_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[output]\nsave = false\n").unwrap();

        let config = Config::load_with_path(Some(path.to_string_lossy().to_string())).unwrap();
        assert!(!config.output.save);
    }

    #[test]
    fn test_load_with_missing_explicit_path_fails() {
        let result = Config::load_with_path(Some("/nonexistent/enhance-prompt.toml".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_with_malformed_explicit_path_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[orchestrator\nbase_url = ").unwrap();

        let result = Config::load_with_path(Some(path.to_string_lossy().to_string()));
        assert!(result.is_err());
    }
}
