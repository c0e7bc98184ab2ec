//! Workflow gateway (v1)
//!
//! An HTTP front for a workflow-execution API.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!                          │                 WORKFLOW GATEWAY                  │
//!                          │                                                   │
//!     Client Request       │  ┌──────────┐   ┌──────────┐   ┌─────────────┐    │
//!     ─────────────────────┼─▶│ preflight│──▶│  router  │──▶│   params    │    │
//!                          │  │ (OPTIONS)│   │ /api/*   │   │ query→json→ │    │
//!                          │  └──────────┘   │/wallpaper│   │    form     │    │
//!                          │                 └────┬─────┘   └──────┬──────┘    │
//!                          │          unmatched   │                ▼           │
//!                          │                      ▼         ┌─────────────┐    │    Token
//!                          │               ┌────────────┐   │  workflow   │────┼──▶ service
//!                          │               │passthrough │   │   client    │    │
//!                          │               └─────┬──────┘   └──────┬──────┘    │
//!                          │                     │                 │           │    Workflow
//!     Client Response      │                     │                 └───────────┼──▶ API
//!     ◀────────────────────┼─────────────────────┴── JSON + CORS ◀─────────────│
//!                          └─────────────────────┼─────────────────────────────┘
//!                                                ▼
//!                                         Static origin
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use workflow_gateway::config::load_config;
use workflow_gateway::lifecycle::signals::spawn_signal_handler;
use workflow_gateway::observability::init_logging;
use workflow_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "workflow-gateway")]
#[command(about = "HTTP gateway in front of a workflow-execution API", long_about = None)]
struct Args {
    /// TOML configuration file. Environment variables override its values.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config.observability);

    tracing::info!("workflow-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        workflow_api = %config.workflow.api_url,
        token_service = %config.token_service.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
