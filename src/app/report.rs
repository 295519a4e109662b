//! Human-readable and JSON rendering of scan results.

use std::fmt::Write as _;

use owo_colors::{OwoColorize, Stream};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::orchestrator::{EtfPairResult, ExpiryOutcome};
use crate::domain::strategy::ArbSolution;
use crate::domain::GreekResult;
use crate::error::Result;

#[derive(Tabled)]
struct ExpiryRow {
    #[tabled(rename = "Expiry")]
    expiry: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Unlevered")]
    unlevered: String,
    #[tabled(rename = "Levered")]
    levered: String,
    #[tabled(rename = "Spread")]
    spread: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

#[derive(Tabled)]
struct LegRow {
    #[tabled(rename = "Leg")]
    leg: &'static str,
    #[tabled(rename = "Contract")]
    contract: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Bid/Ask")]
    bid_ask: String,
    #[tabled(rename = "IV")]
    iv: String,
    #[tabled(rename = "Delta")]
    delta: String,
    #[tabled(rename = "Theta")]
    theta: String,
    #[tabled(rename = "Move to touch")]
    move_to_touch: String,
}

fn expiry_row(outcome: &ExpiryOutcome) -> ExpiryRow {
    match outcome {
        ExpiryOutcome::Solved {
            expiry,
            solution,
            degraded,
        } => ExpiryRow {
            expiry: expiry.clone(),
            status: "solved",
            unlevered: solution.unlevered.contract.to_string(),
            levered: solution.levered.contract.to_string(),
            spread: format!("{:.2}", solution.spread),
            notes: if *degraded > 0 {
                format!("{degraded} iv degraded")
            } else {
                String::new()
            },
        },
        ExpiryOutcome::Skipped { expiry, reason } => ExpiryRow {
            expiry: expiry.clone(),
            status: "skipped",
            unlevered: "-".into(),
            levered: "-".into(),
            spread: "-".into(),
            notes: reason.clone(),
        },
    }
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.2}"))
}

fn leg_row(leg: &'static str, greek: &GreekResult, spot: f64) -> LegRow {
    LegRow {
        leg,
        contract: greek.contract.to_string(),
        price: format!("{:.2}", greek.price),
        bid_ask: format!("{} / {}", optional(greek.bid), optional(greek.ask)),
        iv: if greek.iv_degraded {
            "n/a".into()
        } else {
            format!("{:.1}%", greek.iv * 100.0)
        },
        delta: format!("{:.3}", greek.delta),
        theta: format!("{:.4}", greek.theta),
        move_to_touch: format!("{:+.2}%", greek.pct_to_strike(spot) * 100.0),
    }
}

fn indented(out: &mut String, table: &Table) {
    for line in table.to_string().lines() {
        let _ = writeln!(out, "  {line}");
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}",
        title.if_supports_color(Stream::Stdout, |t| t.bold())
    );
}

fn render_best(out: &mut String, best: &ArbSolution) {
    heading(out, "Best selection");
    let mut legs = Table::new([
        leg_row("unlevered", &best.unlevered, best.unlevered_spot),
        leg_row("levered", &best.levered, best.levered_spot),
    ]);
    legs.with(Style::rounded());
    indented(out, &legs);

    let spread = format!("{:.2}", best.spread);
    let spread = if best.spread >= 0.0 {
        spread.if_supports_color(Stream::Stdout, |t| t.green()).to_string()
    } else {
        spread.if_supports_color(Stream::Stdout, |t| t.red()).to_string()
    };
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<20} {} / {}", "side / objective", best.side, best.objective);
    let _ = writeln!(
        out,
        "  {:<20} {}:{} (standardized {})",
        "ratio", best.ratios.unlevered, best.ratios.levered, best.standardized_ratio
    );
    let _ = writeln!(out, "  {:<20} {spread}", "spread");
}

/// Render a scan result as tables.
#[must_use]
pub fn render(result: &EtfPairResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} / {}  spot {:.2} / {:.2}",
        result
            .unlevered
            .if_supports_color(Stream::Stdout, |t| t.bold()),
        result.levered.if_supports_color(Stream::Stdout, |t| t.bold()),
        result.unlevered_spot,
        result.levered_spot
    );

    heading(&mut out, "Expiries");
    if result.outcomes.is_empty() {
        let _ = writeln!(out, "  no expiries scanned");
    } else {
        let mut table = Table::new(result.outcomes.iter().map(expiry_row));
        table.with(Style::rounded());
        indented(&mut out, &table);
    }

    match &result.best {
        Some(best) => render_best(&mut out, best),
        None => {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "  {}",
                "No feasible selection".if_supports_color(Stream::Stdout, |t| t.yellow())
            );
        }
    }
    out
}

/// Pretty-printed JSON of a scan result.
pub fn to_json(result: &EtfPairResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
