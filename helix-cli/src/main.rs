//! CLI entry point for helix session sync

mod render;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use console::style;
use helix_core::config::validate::validate_config;
use helix_core::config::{Config, ConfigLoader};
use helix_core::features::home_sections;
use helix_core::logging::init_logging;
use helix_core::utils::mask_secret;
use helix_sync::{HttpSessionsApi, Identity, SessionSync, SessionsApi};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "helix-sessions")]
#[command(about = "Follow helix sessions as workers stream their responses")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    /// Helix origin, e.g. https://app.tryhelix.ai
    #[arg(long, global = true)]
    url: Option<String>,

    /// Access token
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the session list once
    List,
    /// Load sessions and print every live change until Ctrl-C
    Watch {
        /// User id reported in logs
        #[arg(short, long, default_value = "cli")]
        user: String,
    },
    /// Print the home page feature grid
    Features {
        /// Include the admin section
        #[arg(long)]
        admin: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if let Some(url) = cli.url {
        config.api.base_url = url;
    }
    if let Some(token) = cli.token {
        config.api.token = token;
    }
    validate_config(&config)?;

    let _guard = init_logging(&config.logging);

    match cli.command {
        Commands::List => list(&config).await,
        Commands::Watch { user } => watch(&config, user).await,
        Commands::Features { admin, json } => features(admin, json),
        Commands::Status => {
            status(&loader, &config);
            Ok(())
        }
    }
}

async fn list(config: &Config) -> Result<()> {
    let api = HttpSessionsApi::new(&config.api)?;
    let sessions = api.list_sessions(&config.api.token).await?;
    info!("Fetched {} sessions", sessions.len());

    let sessions: Vec<_> = sessions.into_iter().map(std::sync::Arc::new).collect();
    render::print_sessions(&sessions);
    Ok(())
}

async fn watch(config: &Config, user: String) -> Result<()> {
    if config.api.token.trim().is_empty() {
        bail!("An access token is required: pass --token or set HELIX_API_KEY");
    }

    let mut sync = SessionSync::from_config(config)?;
    let mut rx = sync.subscribe();

    sync.set_identity(Some(Identity::new(user, config.api.token.clone())))
        .await?;

    let mut previous = {
        let state = rx.borrow_and_update();
        if state.initialized {
            println!("{}", style("Sessions").bold());
            render::print_sessions(&state.sessions);
        } else {
            warn!("Initial load failed, showing live updates only");
        }
        state.sessions.clone()
    };

    println!("{}", style("Watching for updates (Ctrl-C to stop)").dim());

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = rx.borrow_and_update().sessions.clone();
                for session in render::changed_sessions(&previous, &current) {
                    println!("{}", render::session_line(session));
                }
                previous = current;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing event stream");
                break;
            }
        }
    }

    sync.shutdown().await;
    Ok(())
}

fn features(admin: bool, json: bool) -> Result<()> {
    let sections = home_sections(admin);
    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
    } else {
        render::print_features(&sections);
    }
    Ok(())
}

fn status(loader: &ConfigLoader, config: &Config) {
    println!("{}", style("helix-sessions status").bold());
    println!("  Config file:     {}", loader.config_path().display());
    println!("  API origin:      {}", config.api.base_url);
    println!("  Sessions path:   {}", config.api.sessions_path);
    println!("  Stream path:     {}", config.stream.path);
    println!("  Reconnect delay: {}ms", config.stream.reconnect_delay_ms);
    println!("  Access token:    {}", mask_secret(&config.api.token));
    println!("  Log level:       {}", config.logging.level);
}
