mod support;

use smilearb::app::Config;
use smilearb::domain::strategy::ObjectiveMode;
use smilearb::domain::Right;
use smilearb::error::{ConfigError, Error};

use support::{demo_snapshot, pair_config, write_temp_config};

#[test]
fn config_loads_from_file() {
    let file = write_temp_config(&pair_config(Some(&demo_snapshot())));
    let config = Config::load(file.path()).expect("valid config");

    assert_eq!(config.pair.unlevered, "GDX");
    assert_eq!(config.pair.levered, "NUGT");
    assert_eq!(config.data.snapshot.as_deref(), Some(demo_snapshot().as_path()));
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn example_config_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/config.example.toml");
    let config = Config::load(path).expect("example config");

    assert_eq!(config.arb.side, Right::Call);
    assert_eq!(config.arb.objective, ObjectiveMode::Premium);
    assert_eq!(config.pair.ratios().levered, 3.0);
}

#[test]
fn config_rejects_negative_safety_margin() {
    let toml = format!("{}\n[arb]\nsafety_margin = -1.0\n", pair_config(None));
    let file = write_temp_config(&toml);

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "arb.safety_margin",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid safety margin error, got {err}"),
        Ok(_) => panic!("Expected invalid safety margin error, got Ok"),
    }
}

#[test]
fn config_rejects_unknown_side() {
    let toml = format!("{}\n[arb]\nside = \"straddle\"\n", pair_config(None));
    let file = write_temp_config(&toml);

    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))), "got {err}");
}

#[test]
fn config_accepts_broker_right_codes() {
    let toml = format!("{}\n[arb]\nside = \"P\"\n", pair_config(None));
    let file = write_temp_config(&toml);

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.arb.side, Right::Put);
}
