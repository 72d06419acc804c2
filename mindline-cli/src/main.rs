//! CLI entry point for mindline

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use mindline_core::config::{Config, ConfigLoader};
use mindline_core::logging::init_logging;
use mindline_manager::{run_server, AppState};
use mindline_providers::{ChatCompletionsClient, Message, SupportClient};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mindline")]
#[command(about = "A mental health support chat service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP server
    Serve {
        /// Address to bind, overriding the config
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to bind, overriding the config
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask the assistant a single question
    Ask {
        /// Message to send
        #[arg(short, long)]
        message: String,
    },
    /// Show status information
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    // Init must work even when the existing config file does not load.
    let command = match cli.command {
        Commands::Init { force } => return run_init(&config_loader, force),
        command => command,
    };

    let config = config_loader.load()?;
    let _log_guard = init_logging(&config.logging);

    match command {
        Commands::Init { .. } => {}
        Commands::Serve { host, port } => {
            info!("Starting server");
            run_serve(config, host, port).await?;
        }
        Commands::Ask { message } => {
            run_ask(&config, &message).await?;
        }
        Commands::Status => {
            run_status(&config_loader, &config)?;
        }
    }

    Ok(())
}

fn run_init(loader: &ConfigLoader, force: bool) -> Result<()> {
    let path = loader.config_path();
    if path.exists() && !force {
        println!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }

    loader.save(&Config::default())?;
    println!("{} {}", style("Wrote").green(), path.display());
    println!("Set GITHUB_TOKEN or inference.api_key to enable replies.");
    Ok(())
}

async fn run_serve(config: Config, host: Option<IpAddr>, port: Option<u16>) -> Result<()> {
    let host: IpAddr = match host {
        Some(host) => host,
        None => config.server.host.parse()?,
    };
    let addr = SocketAddr::new(host, port.unwrap_or(config.server.port));

    let state = AppState::from_config(&config).await?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        let _ = shutdown_tx.send(());
    });

    println!("{}", style("Starting mindline...").bold().cyan());
    println!("Listening on http://{}", addr);
    run_server(state, addr, shutdown_rx).await
}

async fn run_ask(config: &Config, message: &str) -> Result<()> {
    let client = ChatCompletionsClient::from_config(&config.inference);
    if !client.has_credentials() {
        warn!("No inference API key configured");
    }
    let support = SupportClient::new(Arc::new(client));

    let reply = support.get_reply(vec![Message::user(message)]).await;
    println!("{}", reply);
    Ok(())
}

fn run_status(loader: &ConfigLoader, config: &Config) -> Result<()> {
    println!("{}", style("mindline status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    let file_status = if loader.config_path().exists() {
        style("present").green()
    } else {
        style("missing (defaults in use)").yellow()
    };
    println!("  Config file: {}", file_status);
    println!("  Listen address: {}:{}", config.server.host, config.server.port);
    println!();

    println!("{}", style("Inference:").bold());
    println!("  Endpoint: {}", config.inference.endpoint);
    println!("  Model: {}", config.inference.model);
    let key_status = if config.inference.api_key().is_some() {
        style("configured").green()
    } else {
        style("not configured").red()
    };
    println!("  API key: {}", key_status);
    println!();

    println!("{}", style("Storage:").bold());
    println!("  User database: {}", config.database.url);
    let secret_status = if config.auth.session_secret.trim().is_empty() {
        style("random per process").yellow()
    } else {
        style("configured").green()
    };
    println!("  Session secret: {}", secret_status);

    Ok(())
}
