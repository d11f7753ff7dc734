//! Cyclebot daemon
//!
//! Serves the Claude relay over WebSocket plus the browser UI's static files.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use cyclebot_core::{ClaudeProducer, ClaudeProducerConfig};
use cyclebot_http::{ServerConfig, SharedState};

#[derive(Parser, Debug)]
#[command(name = "cyclebot-daemon")]
#[command(version, about = "Cyclebot daemon - streams Claude over WebSocket JSON-RPC")]
struct Args {
    /// Interface to listen on
    #[arg(long, default_value = "0.0.0.0", env = "CYCLEBOT_HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000, env = "CYCLEBOT_PORT")]
    port: u16,

    /// Directory with index.html and assets served under /static
    #[arg(long, env = "CYCLEBOT_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Path to the `claude` CLI binary
    #[arg(long, default_value = "claude", env = "CYCLEBOT_CLAUDE_PATH")]
    claude_path: String,

    /// Working directory for the agent when a prompt does not set `cwd`
    #[arg(long, env = "CYCLEBOT_WORKING_DIR")]
    working_dir: Option<String>,

    /// Shell prefix used to launch the agent (e.g. "/bin/zsh -l -c")
    #[arg(long, env = "CYCLEBOT_AGENT_SHELL")]
    agent_shell: Option<String>,

    /// Directory for per-prompt agent transcripts
    #[arg(long, env = "CYCLEBOT_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level filter (e.g. "info", "debug"). RUST_LOG takes precedence.
    #[arg(long, default_value = "info", env = "CYCLEBOT_LOG_LEVEL")]
    log_level: String,
}

impl Args {
    fn producer_config(&self) -> ClaudeProducerConfig {
        let working_dir = self.working_dir.clone().or_else(|| {
            std::env::current_dir()
                .ok()
                .map(|dir| dir.to_string_lossy().into_owned())
        });

        ClaudeProducerConfig {
            binary_path: self.claude_path.clone(),
            working_dir,
            shell_prefix: self.agent_shell.clone(),
            log_dir: self.log_dir.clone(),
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            static_dir: self.static_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level.as_str())).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), String> {
    let producer_config = args.producer_config();
    let server_config = args.server_config();

    if let Some(dir) = &server_config.static_dir {
        if !dir.is_dir() {
            log::warn!("Static directory {} does not exist", dir.display());
        }
    }
    log::info!(
        "Using Claude CLI '{}' in {}",
        producer_config.binary_path,
        producer_config.working_dir.as_deref().unwrap_or("<inherited cwd>")
    );

    let producer = Arc::new(ClaudeProducer::new(producer_config));
    let state = Arc::new(SharedState::new(producer, server_config.static_dir.clone()));

    let mut handle = cyclebot_http::start(state, &server_config)
        .await
        .map_err(|e| e.to_string())?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {}", e))?;

    handle.stop().await;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
