//! prismops
//!
//! MCP server and CLI for remote operations on Nutanix clusters

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use eyre::WrapErr;
use rmcp::ServiceExt;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use prismops::{PrismOpsServer, Settings, Toolbox, router};
use prismops_exec::SshConnector;

#[derive(Parser)]
#[command(name = "prismops", version)]
#[command(about = "Remote operations for Nutanix clusters over MCP", long_about = None)]
struct Cli {
    /// Config file (default: $PRISMOPS_CONFIG, ./prismops.toml, /etc/prismops/prismops.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio, or streamable HTTP with --http
    Serve {
        /// Listen address for streamable HTTP; without a value uses `server.bind`
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        http: Option<String>,
    },
    /// Run one command on every SSH host and print the report
    Exec {
        /// Shell command
        command: String,
    },
    /// Run commands in order on every SSH host and print the report
    Batch {
        /// Shell commands, one per argument
        #[arg(required = true)]
        commands: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Logs go to stderr; stdout carries MCP JSON-RPC in stdio mode
fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "prismops={level},prismops_exec={level},prismops_logs={level},prismops_prism={level}"
        )
    }));

    let layer = match format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::load_default()?,
    };
    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

async fn serve_stdio(toolbox: Arc<Toolbox<SshConnector>>) -> Result<()> {
    info!("serving MCP over stdio");
    let service = PrismOpsServer::new(toolbox)
        .serve(rmcp::transport::stdio())
        .await
        .wrap_err("failed to start MCP stdio server")?;
    let reason = service.waiting().await?;
    info!(?reason, "MCP stdio server stopped");
    Ok(())
}

async fn serve_http(toolbox: Arc<Toolbox<SshConnector>>, bind: &str) -> Result<()> {
    let app = router::create_router(toolbox);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .wrap_err_with(|| format!("failed to bind {bind}"))?;
    info!(addr = %bind, "MCP HTTP server listening on /mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_ref())?;
    init_tracing(&settings.server.log_level, cli.log_format);

    let settings = Arc::new(settings);
    let toolbox = Arc::new(Toolbox::new(settings, SshConnector::default())?);

    match cli.command.unwrap_or(Commands::Serve { http: None }) {
        Commands::Serve { http: None } => serve_stdio(toolbox).await?,
        Commands::Serve { http: Some(bind) } => {
            let bind = if bind.is_empty() {
                toolbox.settings().server.bind.clone()
            } else {
                bind
            };
            serve_http(toolbox, &bind).await?;
        }
        Commands::Exec { command } => {
            print!("{}", toolbox.ssh_exec(&command).await?);
        }
        Commands::Batch { commands } => {
            print!("{}", toolbox.ssh_exec_batch(&commands.join("\n")).await?);
        }
    }

    Ok(())
}
