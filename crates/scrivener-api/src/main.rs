//! Scrivener CLI and REST API entry point.
//!
//! Binary name: `scrv`
//!
//! Parses CLI arguments, validates configuration and credentials (fatal
//! before any client action is accepted), wires the coordination core to
//! the HTTP collaborators, and serves the REST dialog surface.

mod http;
mod state;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_complete::generate;
use secrecy::SecretString;

use scrivener_types::config::{ServiceConfig, GENERATOR_API_KEY_VAR, WEBHOOK_SECRET_VAR};
use scrivener_types::error::ConfigError;

use state::AppState;

/// Config file picked up from the working directory when `--config` is
/// not given.
const DEFAULT_CONFIG_PATH: &str = "scrivener.toml";

#[derive(Parser)]
#[command(name = "scrv", version, about = "Conversational report-generation service")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Bridge tracing spans to OpenTelemetry (stdout exporter)
    #[arg(long, global = true)]
    otel: bool,

    /// Path to the service config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST dialog surface
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or tracing
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "scrv", &mut std::io::stdout());
        return Ok(());
    }

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn,scrivener=info",
        1 => "info,scrivener=debug",
        _ => "trace",
    };
    scrivener_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    // Missing generation credentials are fatal before any client action.
    let api_key = require_secret(GENERATOR_API_KEY_VAR)?;
    let webhook_secret = std::env::var(WEBHOOK_SECRET_VAR)
        .ok()
        .filter(|s| !s.is_empty())
        .map(SecretString::from);
    if webhook_secret.is_none() {
        tracing::warn!("{WEBHOOK_SECRET_VAR} not set, deliveries will be unsigned");
    }

    match cli.command {
        Commands::Serve { port, host } => {
            let state = AppState::init(&config, api_key, webhook_secret);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;

            println!(
                "  {} Scrivener listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} workers: {}, queue capacity: {}",
                console::style("·").dim(),
                config.max_concurrency,
                if config.max_queue_length == 0 {
                    "unbounded".to_string()
                } else {
                    config.max_queue_length.to_string()
                }
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            // Stop dispatching; in-flight generations finish on their own.
            state.shutdown();
            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    scrivener_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

/// Load the service config: an explicit `--config` path must exist; the
/// default path is optional and falls back to built-in defaults.
fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !path.exists() {
        if required {
            return Err(ConfigError::Unreadable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        return Ok(ServiceConfig::default());
    }

    let raw =
        std::fs::read_to_string(&path).map_err(|err| ConfigError::Unreadable(err.to_string()))?;
    toml::from_str(&raw).map_err(|err| ConfigError::Unparsable(err.to_string()))
}

fn require_secret(var: &'static str) -> Result<SecretString, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingCredential { var }),
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
