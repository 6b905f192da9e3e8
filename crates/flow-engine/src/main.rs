// crates/flow-engine/src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use flow_engine::config::CONFIG_PATH_ENV;
use flow_engine::{logging, EngineConfig, ReconciliationLoop};
use flow_venue::{HttpVenueClient, InMemoryVenue, VenueClient};

#[derive(Parser)]
#[clap(name = "flow-engine")]
#[clap(about = "Keeps a venue order book populated with synthetic, moving quotes")]
struct Cli {
    /// TOML config file (also read from FLOW_CONFIG)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Venue base URL
    #[clap(long)]
    venue_url: Option<String>,

    /// Market symbol to quote
    #[clap(short, long)]
    market: Option<String>,

    /// Account the orders are placed for
    #[clap(short, long)]
    account_id: Option<String>,

    /// Seed for a reproducible run
    #[clap(long)]
    seed: Option<u64>,

    /// Stop after this many successful cycles
    #[clap(long)]
    max_cycles: Option<u64>,

    /// Cancel all resting orders on shutdown
    #[clap(long)]
    cancel_on_shutdown: bool,

    /// Run against an in-memory venue instead of HTTP
    #[clap(long)]
    dry_run: bool,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

impl Cli {
    fn load_config(&self) -> Result<EngineConfig> {
        let path = self
            .config
            .clone()
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut config = match &path {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        config.apply_env()?;

        if let Some(url) = &self.venue_url {
            config.venue.base_url = url.clone();
        }
        if let Some(market) = &self.market {
            config.venue.market = market.clone();
        }
        if let Some(account) = &self.account_id {
            config.venue.account_id = account.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.max_cycles.is_some() {
            config.max_cycles = self.max_cycles;
        }
        config.cancel_on_shutdown |= self.cancel_on_shutdown;

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let config = cli.load_config()?;
    let shutdown = CancellationToken::new();

    // Ctrl-C ends the loop after the in-flight batch completes.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for ctrl-c");
                return;
            }
            info!("shutdown requested");
            shutdown.cancel();
        });
    }

    if cli.dry_run {
        info!("dry run: quoting against an in-memory venue");
        run_with(InMemoryVenue::new(), config, shutdown).await;
    } else {
        let venue = HttpVenueClient::new(&config.venue.base_url, config.venue.request_timeout())
            .context("building venue client")?;
        info!(venue = %venue.base_url(), "quoting against venue");
        run_with(venue, config, shutdown).await;
    }

    Ok(())
}

async fn run_with<V: VenueClient>(venue: V, config: EngineConfig, shutdown: CancellationToken) {
    let mut engine = ReconciliationLoop::new(venue, config, Utc::now().timestamp_millis());
    engine.run(shutdown).await;
}
