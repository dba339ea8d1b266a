use crate::api::Exchange;
use crate::error::{FollowerError, Result};
use crate::models::{MarketPair, OrderBookLevel};

/// Levels requested from the exchange when pricing a buy
pub const DEFAULT_BOOK_DEPTH: usize = 20;

/// Picks a rate at which a single resting sell order could absorb a buy
///
/// Walks the sell side from the best offer and returns the rate of the first
/// level whose own notional exceeds the amount to spend. This is cheap and
/// crude: it does not simulate sweeping several levels, so on a thin book it
/// reports `InsufficientBookDepth` even when the combined depth would do.
#[derive(Debug, Clone)]
pub struct OrderPricer {
    depth: usize,
}

impl OrderPricer {
    pub fn new(depth: usize) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `levels` must be ordered by ascending rate
    pub fn price_for_notional(levels: &[OrderBookLevel], target_notional: f64) -> Result<f64> {
        let mut deepest: f64 = 0.0;

        for level in levels {
            let notional = level.notional();
            if notional > target_notional {
                return Ok(level.rate);
            }
            deepest = deepest.max(notional);
        }

        Err(FollowerError::InsufficientBookDepth {
            required: target_notional,
            available: deepest,
        })
    }

    /// Fetch the book and price a buy spending `target_notional` base currency
    pub async fn quote_buy(
        &self,
        exchange: &dyn Exchange,
        pair: &MarketPair,
        target_notional: f64,
    ) -> Result<f64> {
        let levels = exchange
            .get_sell_order_book(pair, self.depth)
            .await
            .map_err(|e| FollowerError::source_unavailable(format!("order book {pair}"), &e))?;

        let rate = Self::price_for_notional(&levels, target_notional)?;
        tracing::info!(
            market = %pair,
            target_notional,
            rate,
            levels = levels.len(),
            "Priced buy"
        );
        Ok(rate)
    }
}

impl Default for OrderPricer {
    fn default() -> Self {
        Self::new(DEFAULT_BOOK_DEPTH)
    }
}
