use anyhow::{Context, Result};
use bugtrack_core::Gateway;
use bugtrack_core::config::{ServerConfig, load_server_config};
use bugtrack_core::store::SqliteStore;
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bugtrack-server", version, about = "Serve the bugtrack REST API")]
struct Args {
    /// TOML config file (defaults to ./bugtrack.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Document store connection string, e.g. sqlite://data/bugs.db
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(long, short)]
    port: Option<u16>,

    /// Fail every valid create with a 500 (debugging aid)
    #[arg(long)]
    force_create_failure: bool,
}

impl Args {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(url) = &self.database_url {
            config.database_url = Some(url.clone());
        }
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.force_create_failure {
            config.debug.force_create_failure = true;
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BUGTRACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "bugtrack=debug,info"
        } else {
            "bugtrack=info,warn"
        })
    });

    let format = env::var("BUGTRACK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn resolve_config(args: &Args) -> Result<ServerConfig> {
    let mut config = load_server_config(args.config.as_deref())?;
    config
        .apply_env(|key| env::var(key).ok())
        .context("read server environment")?;
    args.apply(&mut config);
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("could not listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = resolve_config(&args)?;
    let url = match config.database_url() {
        Ok(url) => url.to_string(),
        Err(err) => {
            error!(code = %err.code(), "{err}");
            return Err(err).context("resolve database url");
        }
    };
    let addr = config.listen_addr().context("resolve listen address")?;

    let store = SqliteStore::open(&url).context("connect to document store")?;
    let gateway = Gateway::with_options(Arc::new(store), config.gateway_options());
    if config.debug.force_create_failure {
        warn!("DEBUG_FORCE_CREATE_FAILURE is on: every valid create will fail");
    }

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(addr = %listener.local_addr().unwrap_or(addr), "server listening");

    let served = bugtrack_server::serve(listener, gateway.clone(), shutdown_signal()).await;

    gateway.close().context("close document store")?;
    info!("document store connection closed");
    served
}
