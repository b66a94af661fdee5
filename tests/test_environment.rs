use enhance_prompt::config::Config;
use enhance_prompt::environment::capture;
use enhance_prompt::orchestrator::{HttpOrchestrator, OfflineOrchestrator};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn test_config() -> Config {
    let mut config = Config::default();
    config.orchestrator.runtime = "enhance-prompt-missing-runtime".to_string();
    config
}

#[tokio::test]
async fn test_capture_empty_project() {
    let dir = TempDir::new().unwrap();
    let snapshot = capture(dir.path(), &test_config(), &OfflineOrchestrator::new()).await;

    assert!(snapshot.integrations.is_empty());
    assert!(snapshot.critical_files.is_empty());
    assert!(snapshot.api_endpoints.is_empty());
    assert!(!snapshot.orchestrator_running());
    assert!(!snapshot.redis_running());
    assert!(!snapshot.api_healthy());
}

#[tokio::test]
async fn test_capture_populated_project() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join(".env.local"), "OPENROUTER_API_KEY=x\nNEXTAUTH_URL=y\n").unwrap();
    fs::write(root.join("docker-compose.claude-simple.yml"), "services: {}\n").unwrap();
    fs::create_dir_all(root.join("src/app/api/pitch")).unwrap();
    fs::write(root.join("src/app/api/pitch/route.ts"), "").unwrap();

    let snapshot = capture(root, &test_config(), &OfflineOrchestrator::new()).await;

    assert_eq!(
        snapshot.integrations,
        vec!["OpenRouter API (Model Access)", "NextAuth (Authentication)"]
    );
    assert_eq!(
        snapshot.critical_files,
        vec!["docker-compose.claude-simple.yml", ".env.local"]
    );
    assert_eq!(snapshot.api_endpoints, vec!["src/app/api/pitch/route.ts"]);
}

#[tokio::test]
async fn test_capture_custom_tables() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("settings.env"), "STRIPE_KEY=sk\n").unwrap();
    fs::create_dir_all(root.join("api/v1")).unwrap();
    fs::write(root.join("api/v1/users.rs"), "").unwrap();
    fs::write(root.join("api/v1/users.ts"), "").unwrap();

    let config: Config = toml::from_str(
        r#"
[environment]
env_files = ["settings.env"]

[[environment.markers]]
marker = "STRIPE"
label = "Stripe (Payments)"

[project]
critical_paths = ["api"]
api_dir = "api"
api_extensions = ["rs"]

[orchestrator]
runtime = "enhance-prompt-missing-runtime"
"#,
    )
    .unwrap();

    let snapshot = capture(root, &config, &OfflineOrchestrator::new()).await;
    assert_eq!(snapshot.integrations, vec!["Stripe (Payments)"]);
    assert_eq!(snapshot.critical_files, vec!["api"]);
    assert_eq!(snapshot.api_endpoints, vec!["api/v1/users.rs"]);
}

#[tokio::test]
async fn test_capture_records_healthy_endpoint() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let health = server
        .mock("GET", "/health")
        .with_status(200)
        .create_async()
        .await;

    let client =
        HttpOrchestrator::new(&server.url(), Duration::from_secs(2), Duration::from_secs(2))
            .unwrap();
    let snapshot = capture(dir.path(), &test_config(), &client).await;

    health.assert_async().await;
    assert!(snapshot.api_healthy());
    assert_eq!(snapshot.orchestrator_endpoint, Some(server.url()));
}
