//! Server binary for readpaper.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to an `ExplainConfig` and serves the HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use readpaper::{AppState, ExplainConfig};
use std::io;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Stub mode (no API key): deterministic placeholder explanations
  readpaper

  # Real explanations via the configured backend
  OPENAI_API_KEY=sk-... readpaper

  # Pick a model and bind address
  OPENAI_API_KEY=sk-... readpaper --model gpt-5 --bind 0.0.0.0:8080

  # Point at an OpenAI-compatible proxy
  readpaper --api-base http://localhost:4000/v1

ENDPOINTS:
  POST /api/explain-batch   { chunkLines, startIndex?, endIndex?, delimiter? }
  POST /api/fetch-url       { url }
  GET  /health              { ok, keyLoaded, model }

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY    Credential for the model backend; unset = stub mode
  OPENAI_MODEL      Model identifier (default: gpt-5)
"#;

/// Explain academic papers line by line in Japanese over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "readpaper",
    version,
    about = "Line-by-line paper explanation service",
    long_about = "Serve the readpaper HTTP API: upload-side chunked line ranges in, \
one short Japanese explanation per line out. Without OPENAI_API_KEY the service \
runs in deterministic stub mode and never touches the network for explanations.",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "READPAPER_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Model identifier sent with every invocation.
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Base URL of the model backend's REST API.
    #[arg(long, env = "READPAPER_API_BASE")]
    api_base: Option<String>,

    /// Per-invocation-attempt timeout in seconds.
    #[arg(long, env = "READPAPER_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Page-fetch timeout in seconds.
    #[arg(long, env = "READPAPER_FETCH_TIMEOUT", default_value_t = 30)]
    fetch_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "READPAPER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "READPAPER_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    // The credential is only ever read from the environment, never a flag.
    let mut builder = ExplainConfig::builder()
        .api_timeout_secs(cli.api_timeout)
        .fetch_timeout_secs(cli.fetch_timeout);

    let env = ExplainConfig::from_env();
    if let Some(key) = env.api_key {
        builder = builder.api_key(key);
    }
    builder = builder.model(cli.model.unwrap_or(env.model));
    if let Some(base) = cli.api_base {
        builder = builder.api_base(base);
    }

    let config = builder.build().context("Invalid configuration")?;
    let state = AppState::new(config).context("Failed to initialise server state")?;

    // ── Serve ────────────────────────────────────────────────────────────
    readpaper::serve(cli.bind, state)
        .await
        .context("Server exited with an error")?;

    Ok(())
}
