//! Black-Scholes pricing without dividends.
//!
//! Formulas are evaluated as written, without special-casing zero vol or
//! zero time: a zero vol drives `d1` to ±∞ so the price collapses onto the
//! discounted intrinsic value, and gamma becomes `0/0`. Callers that need a
//! finite gamma in that regime apply their own boundary rule.
//!
//! Conventions: theta is per calendar day (÷365), vega is per vol point
//! (×0.01).

use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::erfc;
use thiserror::Error;

use crate::domain::Right;

const IV_PRICE_TOLERANCE: f64 = 1e-10;
const IV_VOL_TOLERANCE: f64 = 1e-12;
const IV_MAX_NEWTON: usize = 64;
const IV_MAX_BISECTION: usize = 200;
const IV_LOWER_VOL: f64 = 1e-9;
const IV_UPPER_VOL: f64 = 10.0;

/// Why a market price could not be inverted into an implied vol.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ImpliedVolFailure {
    #[error("non-finite or non-positive input")]
    InvalidInput,

    #[error("contract has no time left")]
    Expired,

    #[error("price {price} at or below the no-arbitrage floor {floor}")]
    BelowIntrinsic { price: f64, floor: f64 },

    #[error("price {price} at or above the no-arbitrage cap {cap}")]
    AboveMaximum { price: f64, cap: f64 },

    #[error("solver did not converge")]
    NoConvergence,
}

/// Standard normal CDF.
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF.
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

fn d1(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

fn d2(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    d1(spot, strike, time, rate, vol) - vol * time.sqrt()
}

/// European option price.
#[must_use]
pub fn price(right: Right, spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    let d1 = d1(spot, strike, time, rate, vol);
    let d2 = d2(spot, strike, time, rate, vol);
    let df = (-rate * time).exp();
    match right {
        Right::Call => spot * norm_cdf(d1) - strike * df * norm_cdf(d2),
        Right::Put => strike * df * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

#[must_use]
pub fn delta(right: Right, spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    let d1 = d1(spot, strike, time, rate, vol);
    match right {
        Right::Call => norm_cdf(d1),
        Right::Put => norm_cdf(d1) - 1.0,
    }
}

#[must_use]
pub fn gamma(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    let d1 = d1(spot, strike, time, rate, vol);
    norm_pdf(d1) / (spot * vol * time.sqrt())
}

#[must_use]
pub fn vega(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    let d1 = d1(spot, strike, time, rate, vol);
    spot * norm_pdf(d1) * time.sqrt() * 0.01
}

#[must_use]
pub fn theta(right: Right, spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    let d1 = d1(spot, strike, time, rate, vol);
    let d2 = d1 - vol * time.sqrt();
    let df = (-rate * time).exp();
    let decay = -spot * norm_pdf(d1) * vol / (2.0 * time.sqrt());
    let carry = match right {
        Right::Call => -rate * strike * df * norm_cdf(d2),
        Right::Put => rate * strike * df * norm_cdf(-d2),
    };
    (decay + carry) / 365.0
}

/// No-arbitrage price band `(floor, cap)` for a European option.
#[must_use]
pub fn price_bounds(right: Right, spot: f64, strike: f64, time: f64, rate: f64) -> (f64, f64) {
    let pv_strike = strike * (-rate * time).exp();
    let floor = right.intrinsic(spot, pv_strike);
    match right {
        Right::Call => (floor, spot),
        Right::Put => (floor, pv_strike),
    }
}

/// Invert [`price`] for the volatility.
///
/// Newton-Raphson on vega from a Brenner-Subrahmanyam start, falling back to
/// bisection when a step leaves the bracket or vega vanishes.
pub fn implied_volatility(
    market_price: f64,
    right: Right,
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
) -> Result<f64, ImpliedVolFailure> {
    let finite = [market_price, spot, strike, time, rate]
        .iter()
        .all(|v| v.is_finite());
    if !finite || spot <= 0.0 || strike <= 0.0 {
        return Err(ImpliedVolFailure::InvalidInput);
    }
    if time <= 0.0 {
        return Err(ImpliedVolFailure::Expired);
    }

    let (floor, cap) = price_bounds(right, spot, strike, time, rate);
    if market_price <= floor {
        return Err(ImpliedVolFailure::BelowIntrinsic {
            price: market_price,
            floor,
        });
    }
    if market_price >= cap {
        return Err(ImpliedVolFailure::AboveMaximum {
            price: market_price,
            cap,
        });
    }

    let mut vol = (market_price / (0.4 * spot * time.sqrt())).clamp(0.01, 3.0);
    for _ in 0..IV_MAX_NEWTON {
        let diff = price(right, spot, strike, time, rate, vol) - market_price;
        if diff.abs() < IV_PRICE_TOLERANCE {
            return Ok(vol);
        }

        let raw_vega = vega(spot, strike, time, rate, vol) * 100.0;
        if raw_vega.abs() < 1e-12 {
            break;
        }

        let next = vol - diff / raw_vega;
        if !(IV_LOWER_VOL..=IV_UPPER_VOL).contains(&next) {
            break;
        }
        vol = next;
    }

    bisection(market_price, right, spot, strike, time, rate)
}

fn bisection(
    market_price: f64,
    right: Right,
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
) -> Result<f64, ImpliedVolFailure> {
    let mut low = IV_LOWER_VOL;
    let mut high = IV_UPPER_VOL;
    if price(right, spot, strike, time, rate, high) < market_price {
        return Err(ImpliedVolFailure::NoConvergence);
    }

    for _ in 0..IV_MAX_BISECTION {
        let mid = 0.5 * (low + high);
        let diff = price(right, spot, strike, time, rate, mid) - market_price;
        if diff.abs() < IV_PRICE_TOLERANCE || high - low < IV_VOL_TOLERANCE {
            return Ok(mid);
        }
        if diff > 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    Err(ImpliedVolFailure::NoConvergence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_cdf_reference_points() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 1e-3);
        assert_eq!(norm_cdf(f64::INFINITY), 1.0);
        assert_eq!(norm_cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn atm_call_reference_price() {
        // S=K=100, r=5%, σ=20%, t=1: textbook value 10.4506.
        let call = price(Right::Call, 100.0, 100.0, 1.0, 0.05, 0.2);
        assert!((call - 10.4506).abs() < 1e-3, "got {call}");
    }

    #[test]
    fn put_call_parity() {
        let (s, k, t, r, v) = (42.0, 45.0, 0.3, 0.025, 0.35);
        let call = price(Right::Call, s, k, t, r, v);
        let put = price(Right::Put, s, k, t, r, v);
        let parity = call - put - (s - k * (-r * t).exp());
        assert!(parity.abs() < 1e-10);
    }

    #[test]
    fn greeks_have_expected_signs() {
        let (s, k, t, r, v) = (100.0, 105.0, 0.25, 0.025, 0.3);
        assert!(delta(Right::Call, s, k, t, r, v) > 0.0);
        assert!(delta(Right::Put, s, k, t, r, v) < 0.0);
        assert!(gamma(s, k, t, r, v) > 0.0);
        assert!(vega(s, k, t, r, v) > 0.0);
        assert!(theta(Right::Call, s, k, t, r, v) < 0.0);
    }

    #[test]
    fn implied_vol_round_trips_inside_bounds() {
        let rights = [Right::Call, Right::Put];
        let spots = [25.0, 100.0];
        let moneyness = [0.7, 0.9, 1.0, 1.1, 1.4];
        let times = [5.0 / 252.0, 0.25, 1.5];
        let vols = [0.08, 0.25, 0.6, 1.5];

        for right in rights {
            for spot in spots {
                for m in moneyness {
                    for t in times {
                        for v in vols {
                            let strike = spot * m;
                            let target = price(right, spot, strike, t, 0.025, v);
                            let (floor, cap) = price_bounds(right, spot, strike, t, 0.025);
                            if target <= floor + 1e-9 || target >= cap {
                                continue;
                            }
                            let iv = implied_volatility(target, right, spot, strike, t, 0.025)
                                .unwrap_or_else(|e| {
                                    panic!("{right} S={spot} K={strike} t={t} v={v}: {e}")
                                });
                            let repriced = price(right, spot, strike, t, 0.025, iv);
                            assert!(
                                (repriced - target).abs() < 1e-7,
                                "{right} S={spot} K={strike} t={t} v={v}: {repriced} vs {target}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn bounds_floor_is_intrinsic_against_discounted_strike() {
        let (t, r): (f64, f64) = (0.5, 0.025);
        let pv_strike = 100.0 * (-r * t).exp();

        let (floor, cap) = price_bounds(Right::Call, 110.0, 100.0, t, r);
        assert!((floor - (110.0 - pv_strike)).abs() < 1e-12);
        assert_eq!(cap, 110.0);

        let (floor, cap) = price_bounds(Right::Put, 110.0, 100.0, t, r);
        assert_eq!(floor, 0.0);
        assert!((cap - pv_strike).abs() < 1e-12);
    }

    #[test]
    fn implied_vol_rejects_out_of_bounds_prices() {
        // Call worth less than its intrinsic value.
        assert!(matches!(
            implied_volatility(1.0, Right::Call, 110.0, 100.0, 0.1, 0.025),
            Err(ImpliedVolFailure::BelowIntrinsic { .. })
        ));
        // Call worth more than the stock.
        assert!(matches!(
            implied_volatility(120.0, Right::Call, 110.0, 100.0, 0.1, 0.025),
            Err(ImpliedVolFailure::AboveMaximum { .. })
        ));
        assert_eq!(
            implied_volatility(f64::NAN, Right::Put, 110.0, 100.0, 0.1, 0.025),
            Err(ImpliedVolFailure::InvalidInput)
        );
        assert_eq!(
            implied_volatility(1.0, Right::Put, 110.0, 100.0, -0.1, 0.025),
            Err(ImpliedVolFailure::Expired)
        );
    }

    #[test]
    fn zero_vol_otm_call_has_zero_delta_and_nan_gamma() {
        let (s, k, t, r) = (95.0, 100.0, 0.1, 0.025);
        assert_eq!(delta(Right::Call, s, k, t, r, 0.0), 0.0);
        assert!(gamma(s, k, t, r, 0.0).is_nan());
    }
}
