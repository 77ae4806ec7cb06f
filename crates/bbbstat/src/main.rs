use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bbbstat::AppState;
use bbbstat_core::config::{DisplayConfig, StoreConfig};
use bbbstat_core::normalize::NormalizeConfig;
use bbbstat_core::store::{DynamoRecordSource, JsonFileSource, RecordSource};
use bbbstat_core::{Dashboard, MeetingRecord};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const BIND_VAR: &str = "BBBSTAT_BIND";
const DEFAULT_PORT: u16 = 8050;

#[derive(Parser, Debug)]
#[command(author, version, about = "Meeting activity dashboard", long_about = None)]
struct Cli {
    /// Read records from a JSON file instead of the DynamoDB table
    #[arg(long, global = true)]
    records: Option<PathBuf>,
    /// TOML file overriding labels, month marks and page size
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the dashboard web server (default)
    Serve(ServeArgs),
    /// Print the column totals and exit
    Summary,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Address to listen on (falls back to BBBSTAT_BIND, then 0.0.0.0:8050)
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Return error details to clients. Disable before exposing the server.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    let display = match &cli.config {
        Some(path) => DisplayConfig::load(path)
            .with_context(|| format!("failed to load display config {}", path.display()))?,
        None => DisplayConfig::default(),
    };
    let normalize = NormalizeConfig::from_env().context("invalid normalization settings")?;

    let records = load_records(&cli).await?;
    let dashboard = Dashboard::build(&records, &normalize, display)
        .context("failed to build dashboard dataset")?;

    match cli.command {
        Some(Command::Serve(args)) => serve(dashboard, args).await,
        None => serve(dashboard, ServeArgs::default()).await,
        Some(Command::Summary) => {
            println!("{}", bbbstat::report::render_summary(&dashboard));
            Ok(())
        }
    }
}

async fn load_records(cli: &Cli) -> Result<Vec<MeetingRecord>> {
    let source: Box<dyn RecordSource> = match &cli.records {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => {
            let config = StoreConfig::from_env()?;
            Box::new(
                DynamoRecordSource::new(config)
                    .await
                    .context("failed to configure DynamoDB client")?,
            )
        }
    };

    info!(source = %source.describe(), "fetching meeting records");
    source
        .scan_all()
        .await
        .with_context(|| format!("failed to read records from {}", source.describe()))
}

async fn serve(dashboard: Dashboard, args: ServeArgs) -> Result<()> {
    let bind = resolve_bind(args.bind)?;
    if args.debug {
        warn!("debug mode enabled: error details are returned to clients");
    }

    let state = AppState::new(Arc::new(dashboard), args.debug);
    let router = bbbstat::router(state);

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}

fn resolve_bind(flag: Option<SocketAddr>) -> Result<SocketAddr> {
    if let Some(addr) = flag {
        return Ok(addr);
    }
    match std::env::var(BIND_VAR) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{BIND_VAR} is not a socket address: '{raw}'")),
        Err(_) => Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))),
    }
}
