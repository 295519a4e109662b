use std::path::Path;

use crate::app::Config;
use crate::cli::diagnostic::{ConfigDiagnostic, InvalidConfig};
use crate::cli::output;
use crate::error::{ConfigError, Error};

/// Validate configuration file without scanning.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> miette::Result<()> {
    let path = config_path.as_ref();
    output::section(&format!("Checking configuration: {}", path.display()));

    let content = std::fs::read_to_string(path).map_err(|e| {
        InvalidConfig::new(format!("cannot read {}: {e}", path.display()))
            .with_help("pass the config path with --config")
    })?;

    let config = match Config::parse(&content) {
        Ok(config) => config,
        Err(Error::Config(ConfigError::Parse(err))) => {
            return Err(ConfigDiagnostic::from_toml(&path.display().to_string(), &content, &err).into());
        }
        Err(err) => return Err(InvalidConfig::new(err.to_string()).into()),
    };

    output::success("Configuration file is valid");
    output::section("Summary");
    output::field(
        "pair",
        format!(
            "{} / {} ({}:{})",
            config.pair.unlevered,
            config.pair.levered,
            config.pair.unlevered_ratio,
            config.pair.levered_ratio
        ),
    );
    output::field("side", config.arb.side);
    output::field("objective", config.arb.objective);
    output::field("safety margin", config.arb.safety_margin);
    output::field("risk-free rate", config.pricing.risk_free_rate);
    if config.expiry.dates.is_empty() {
        output::field(
            "expiries",
            format!("next {}{}", config.expiry.count, if config.expiry.cboe { " (cboe)" } else { "" }),
        );
    } else {
        output::field("expiries", config.expiry.dates.join(", "));
    }

    match &config.data.snapshot {
        Some(snapshot) if snapshot.is_file() => {
            output::success(&format!("Snapshot found: {}", snapshot.display()));
        }
        Some(snapshot) => output::warning(&format!("Snapshot not found: {}", snapshot.display())),
        None => output::warning("No snapshot configured; pass --snapshot to scan"),
    }
    if let Some(dir) = &config.cache.dir {
        output::field("cache", format!("{} (ttl {}s)", dir.display(), config.cache.ttl_secs));
    }

    Ok(())
}
