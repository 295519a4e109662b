//! Per-contract implied vol, Greeks and margin stress.

use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::warn;

use super::black_scholes::{self, ImpliedVolFailure};
use crate::domain::{Contract, Quote, Right};

/// Default annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.025;

/// Volatility used to re-price contracts across the stress grid.
pub const DEFAULT_STRESS_VOL: f64 = 0.2425;

/// Seconds in a 252-day trading year of 24-hour days.
pub const YEAR_SECONDS: f64 = 252.0 * 24.0 * 60.0 * 60.0;

/// Stress grid as multiples of spot, inclusive at both ends.
const STRESS_LOW: f64 = 0.92;
const STRESS_HIGH: f64 = 1.06;
const STRESS_POINTS: usize = 10;

/// Contracts stop trading at 16:00 local on their expiry date.
const EXPIRY_CUTOFF_HOUR: u32 = 16;

/// What the engine is given to price a contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceInput {
    /// Observed market price; the implied vol is solved for.
    Market(f64),
    /// Known implied vol; the price is computed from it.
    Vol(f64),
}

/// Pricing output for one contract under one quote snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct GreekResult {
    pub contract: Contract,
    pub strike: f64,
    pub right: Right,
    /// Implied vol. `0.0` together with `iv_degraded` marks a failed inversion.
    pub iv: f64,
    /// Observed market price if one was supplied, otherwise the model price.
    pub price: f64,
    pub delta: f64,
    pub theta: f64,
    pub vega: f64,
    pub gamma: f64,
    /// Model value × multiplier at each point of the spot stress grid.
    pub margin_impacts: Vec<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    /// Year fraction to expiry; negative once expired.
    pub dt: f64,
    pub rate: f64,
    pub iv_degraded: bool,
}

impl GreekResult {
    /// Re-price this contract at another spot and vol.
    #[must_use]
    pub fn price_at(&self, spot: f64, iv: f64) -> f64 {
        black_scholes::price(self.right, spot, self.strike, self.dt, self.rate, iv)
    }

    /// Vega at another spot, using this contract's implied vol.
    #[must_use]
    pub fn vega_at(&self, spot: f64) -> f64 {
        black_scholes::vega(spot, self.strike, self.dt, self.rate, self.iv)
    }

    /// Fractional move from `spot` to this strike: `(strike - spot) / spot`.
    #[must_use]
    pub fn pct_to_strike(&self, spot: f64) -> f64 {
        (self.strike - spot) / spot
    }
}

/// Converts contracts and prices into [`GreekResult`]s.
#[derive(Debug, Clone, Copy)]
pub struct GreekEngine {
    rate: f64,
    stress_vol: f64,
    now: Option<NaiveDateTime>,
}

impl Default for GreekEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_FREE_RATE)
    }
}

impl GreekEngine {
    /// Engine reading the local clock on every computation.
    #[must_use]
    pub const fn new(rate: f64) -> Self {
        Self {
            rate,
            stress_vol: DEFAULT_STRESS_VOL,
            now: None,
        }
    }

    /// Override the stress-grid volatility.
    #[must_use]
    pub const fn with_stress_vol(mut self, stress_vol: f64) -> Self {
        self.stress_vol = stress_vol;
        self
    }

    /// Pin the clock to a fixed local time.
    #[must_use]
    pub const fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Year fraction from now until 16:00 local on the contract's expiry.
    #[must_use]
    pub fn time_to_expiry(&self, contract: &Contract) -> f64 {
        let now = self.now.unwrap_or_else(|| Local::now().naive_local());
        let cutoff = NaiveTime::from_hms_opt(EXPIRY_CUTOFF_HOUR, 0, 0).unwrap_or_default();
        let expiry = contract.expiry.and_time(cutoff);
        (expiry - now).num_milliseconds() as f64 / 1000.0 / YEAR_SECONDS
    }

    /// Price a contract from a quote, using its market price.
    ///
    /// A quote without a usable price yields a NaN price, which the
    /// optimizer filters out.
    #[must_use]
    pub fn from_quote(&self, contract: &Contract, quote: &Quote, spot: f64) -> GreekResult {
        let market = quote.market_price().unwrap_or(f64::NAN);
        let mut result = self.compute(contract, spot, PriceInput::Market(market));
        result.bid = quote.bid;
        result.ask = quote.ask;
        result
    }

    /// Compute implied vol, price, Greeks and margin impacts.
    ///
    /// Never fails: an implied vol that cannot be solved for degrades to
    /// `0.0` and is logged.
    #[must_use]
    pub fn compute(&self, contract: &Contract, spot: f64, input: PriceInput) -> GreekResult {
        let strike = contract.strike_f64();
        let right = contract.right;
        let dt = self.time_to_expiry(contract);
        let rate = self.rate;

        let (iv, price, iv_degraded) = match input {
            PriceInput::Market(price) => {
                match black_scholes::implied_volatility(price, right, spot, strike, dt, rate) {
                    Ok(iv) => (iv, price, false),
                    Err(failure) => {
                        log_degraded(contract, price, spot, dt, failure);
                        (0.0, price, true)
                    }
                }
            }
            PriceInput::Vol(iv) => (
                iv,
                black_scholes::price(right, spot, strike, dt, rate, iv),
                false,
            ),
        };

        let delta = black_scholes::delta(right, spot, strike, dt, rate, iv);
        let theta = black_scholes::theta(right, spot, strike, dt, rate, iv);
        let vega = black_scholes::vega(spot, strike, dt, rate, iv);
        let mut gamma = black_scholes::gamma(spot, strike, dt, rate, iv);

        // Delta pinned at exactly zero means the density underflowed too.
        if gamma.is_nan() && delta == 0.0 {
            gamma = 0.0;
        }

        let multiplier = f64::from(contract.multiplier);
        let margin_impacts = stress_grid(spot)
            .map(|level| {
                black_scholes::price(right, level, strike, dt, rate, self.stress_vol) * multiplier
            })
            .collect();

        GreekResult {
            contract: contract.clone(),
            strike,
            right,
            iv,
            price,
            delta,
            theta,
            vega,
            gamma,
            margin_impacts,
            bid: None,
            ask: None,
            dt,
            rate,
            iv_degraded,
        }
    }
}

/// Spot levels evenly spaced over `[0.92 × spot, 1.06 × spot]`.
fn stress_grid(spot: f64) -> impl Iterator<Item = f64> {
    let step = (STRESS_HIGH - STRESS_LOW) / (STRESS_POINTS - 1) as f64;
    (0..STRESS_POINTS).map(move |i| spot * (STRESS_LOW + step * i as f64))
}

fn log_degraded(contract: &Contract, price: f64, spot: f64, dt: f64, failure: ImpliedVolFailure) {
    warn!(
        contract = %contract,
        price,
        spot,
        dt,
        reason = %failure,
        "implied vol inversion failed, using iv = 0"
    );
}
