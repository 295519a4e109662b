//! Point-in-time option and stock quotes.

use serde::{Deserialize, Serialize};

/// A top-of-book snapshot. Missing fields are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub bid_size: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub ask_size: Option<f64>,
    #[serde(default)]
    pub last: Option<f64>,
}

impl Quote {
    /// Quote with both sides and a last trade.
    #[must_use]
    pub fn new(bid: f64, ask: f64, last: f64) -> Self {
        Self {
            bid: Some(bid),
            ask: Some(ask),
            last: Some(last),
            ..Self::default()
        }
    }

    /// Quote carrying only a last trade, as for an index or a closed market.
    #[must_use]
    pub fn last_only(last: f64) -> Self {
        Self {
            last: Some(last),
            ..Self::default()
        }
    }

    fn bid_ask(&self) -> Option<(f64, f64)> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) if bid > 0.0 && ask > 0.0 && bid.is_finite() && ask.is_finite() => {
                Some((bid, ask))
            }
            _ => None,
        }
    }

    /// Midpoint of a valid two-sided market.
    #[must_use]
    pub fn midpoint(&self) -> Option<f64> {
        self.bid_ask().map(|(bid, ask)| (bid + ask) / 2.0)
    }

    /// Best estimate of the traded price.
    ///
    /// Last trade if it sits inside a valid two-sided market, otherwise the
    /// midpoint. Without a two-sided market, a finite last trade is used.
    #[must_use]
    pub fn market_price(&self) -> Option<f64> {
        let last = self.last.filter(|l| l.is_finite() && *l > 0.0);
        match (self.bid_ask(), last) {
            (Some((bid, ask)), Some(last)) if bid <= last && last <= ask => Some(last),
            (Some(_), _) => self.midpoint(),
            (None, last) => last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_inside_market_wins() {
        assert_eq!(Quote::new(1.0, 1.2, 1.1).market_price(), Some(1.1));
    }

    #[test]
    fn last_outside_market_falls_back_to_mid() {
        let quote = Quote::new(1.0, 1.2, 1.5);
        assert!((quote.market_price().unwrap() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn one_sided_market_uses_last() {
        let quote = Quote {
            bid: Some(0.0),
            ask: Some(0.05),
            last: Some(0.03),
            ..Quote::default()
        };
        assert_eq!(quote.midpoint(), None);
        assert_eq!(quote.market_price(), Some(0.03));
    }

    #[test]
    fn empty_quote_has_no_price() {
        assert_eq!(Quote::default().market_price(), None);
    }
}
