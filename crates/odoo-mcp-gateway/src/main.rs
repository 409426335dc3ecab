//! # odoo-mcp
//!
//! Exposes an Odoo instance to AI agents, either as MCP tools over stdio or
//! as a JSON API over HTTP. Both surfaces share one connection and one
//! operation registry.
//!
//! ## Usage
//! ```bash
//! # MCP client spawns the gateway and talks over stdin/stdout
//! ODOO_URL=https://erp.example.com ODOO_DATABASE=prod odoo-mcp stdio
//!
//! # JSON API on port 8000
//! odoo-mcp http --port 8000
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use odoo_http_mcp_server::HttpGatewayServer;
use odoo_mcp_server::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const INSTRUCTIONS: &str = "Call odoo_connect first (url, database, username, password; \
missing values fall back to the ODOO_* environment variables), then use the other \
odoo_* tools. Domains use Odoo syntax, e.g. [[\"is_company\", \"=\", true]].";

#[derive(Parser, Debug)]
#[command(name = "odoo-mcp", author, version, about, long_about = None)]
struct Args {
    /// Log filter when RUST_LOG is unset (e.g. "info", "odoo_rpc_client=debug")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Number of blocking workers for remote calls
    #[arg(long, global = true, default_value_t = 8)]
    workers: usize,

    /// Per-request timeout for remote calls, in seconds (none by default)
    #[arg(long, global = true)]
    request_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP tools over stdin/stdout
    Stdio,

    /// Serve the JSON API over HTTP
    Http {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "PORT", default_value_t = 8000)]
        port: u16,

        /// Do not add CORS headers
        #[arg(long)]
        no_cors: bool,
    },
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_worker_threads(self.workers)
            .with_request_timeout(self.request_timeout_secs.map(Duration::from_secs))
    }
}

/// Logs go to stderr; stdout belongs to the stdio protocol
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let connection = Arc::new(RpcConnection::new(args.client_config()));
    let registry = Arc::new(OperationRegistry::new(Arc::clone(&connection)));

    match args.command {
        Command::Stdio => {
            let server = McpServer::builder()
                .name("odoo-mcp-server")
                .version(env!("CARGO_PKG_VERSION"))
                .title("Odoo ERP")
                .instructions(INSTRUCTIONS)
                .registry(registry)
                .build()?;
            server.run_stdio().await?;
        }
        Command::Http {
            host,
            port,
            no_cors,
        } => {
            let bind_address: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid listen address {host}:{port}"))?;
            let server = HttpGatewayServer::builder()
                .bind_address(bind_address)
                .cors(!no_cors)
                .service("odoo-mcp-gateway", env!("CARGO_PKG_VERSION"))
                .registry(registry)
                .build()?;

            tokio::select! {
                result = server.run() => result?,
                _ = tokio::signal::ctrl_c() => info!("Shutting down"),
            }
        }
    }

    connection.disconnect();
    Ok(())
}
