use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use enhance_prompt::cli;

#[derive(Parser)]
#[command(name = "enhance-prompt", version)]
#[command(
    about = "Annotate a request with project context and a strict-compliance directive",
    long_about = None
)]
struct Cli {
    /// Request text; read from stdin when omitted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    request: Vec<String>,

    /// Project root to inspect
    #[arg(long, default_value = ".")]
    root: String,

    /// Path to config file (defaults to ./enhance-prompt.toml or ~/.config/enhance-prompt/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Override the orchestrator base URL (e.g., "http://localhost:3000")
    #[arg(long)]
    orchestrator_url: Option<String>,

    /// Skip the orchestrator health check and forwarding entirely
    #[arg(long)]
    offline: bool,

    /// Check orchestrator health but do not submit the directive
    #[arg(long)]
    no_forward: bool,

    /// Do not persist the result under the cache directory
    #[arg(long)]
    no_save: bool,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON result; logs go to stderr
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = cli::enhance::run(
        cli.request,
        cli.root,
        cli.config,
        cli.orchestrator_url,
        cli.offline,
        cli.no_forward,
        cli.no_save,
    )
    .await?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
