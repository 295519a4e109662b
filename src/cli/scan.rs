//! The `scan` command.

use std::sync::Arc;

use chrono::Local;
use tracing::info;

use crate::adapter::{CachedProvider, SnapshotProvider};
use crate::app::{report, Config, EtfPair};
use crate::cli::ScanArgs;
use crate::domain::solver::HiGHSSolver;
use crate::domain::strategy::ObjectiveMode;
use crate::error::{ConfigError, Result};
use crate::exchange::MarketDataProvider;

/// Apply command-line overrides on top of the loaded config.
fn apply_overrides(config: &mut Config, args: &ScanArgs) {
    if let Some(snapshot) = &args.snapshot {
        config.data.snapshot = Some(snapshot.clone());
    }
    if let Some(side) = args.side {
        config.arb.side = side;
    }
    if let Some(count) = args.expiries {
        config.expiry.count = count;
        config.expiry.dates.clear();
    }
    if args.theta {
        config.arb.objective = ObjectiveMode::Theta;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
}

/// Load config, replay the snapshot and print the best selection.
pub async fn execute(args: &ScanArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    apply_overrides(&mut config, args);
    config.validate()?;
    config.init_logging();

    let snapshot_path = config
        .data
        .snapshot
        .clone()
        .ok_or(ConfigError::MissingField {
            field: "data.snapshot",
        })?;
    let snapshot = SnapshotProvider::load(&snapshot_path)?;

    // Replayed quotes are priced as of the moment they were recorded.
    let mut engine = config.pricing.engine();
    let today = match snapshot.as_of() {
        Some(as_of) => {
            engine = engine.at(as_of);
            as_of.date()
        }
        None => Local::now().date_naive(),
    };
    let expiries = config.expiry.resolve(today);

    let provider: Arc<dyn MarketDataProvider> = Arc::new(snapshot);
    let provider: Arc<dyn MarketDataProvider> = match &config.cache.dir {
        Some(dir) => Arc::new(CachedProvider::open(provider, dir, config.cache.ttl())?),
        None => provider,
    };

    let pair = EtfPair::from_config(&config, provider, Arc::new(HiGHSSolver::new()))
        .with_engine(engine);
    let result = pair.scan(&expiries).await?;
    info!(solved = result.solved_count(), scanned = expiries.len(), "Scan complete");

    if args.json {
        println!("{}", report::to_json(&result)?);
    } else {
        print!("{}", report::render(&result));
    }
    Ok(())
}
