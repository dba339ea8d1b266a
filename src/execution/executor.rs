use serde::Serialize;
use std::sync::Arc;

use crate::api::Exchange;
use crate::error::{FollowerError, Result};
use crate::execution::OrderPricer;
use crate::models::{MarketPair, OrderConfirmation, OrderSide, Stance};

/// Bittrex accepts quantities with 8 decimal places
pub const QUANTITY_DECIMALS: i32 = 8;

/// Round toward zero onto the exchange's quantity step, so an order never
/// asks for more than the balance it was sized from
pub fn truncate_quantity(quantity: f64) -> f64 {
    let scale = 10f64.powi(QUANTITY_DECIMALS);
    (quantity * scale).floor() / scale
}

/// A sized order, ready to submit
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderPlan {
    pub market: MarketPair,
    pub side: OrderSide,
    pub quantity: f64,
    /// Rate chosen from the book; only buys are priced
    pub price: Option<f64>,
    pub reason: String,
}

/// Turns a trade direction into exactly one market order
///
/// `Long` spends the whole base balance: the book is priced and the buy is
/// sized as `base_balance / price`. `Short` sells the whole available
/// market-currency balance.
pub struct TradeExecutor {
    exchange: Arc<dyn Exchange>,
    pricer: OrderPricer,
}

impl TradeExecutor {
    pub fn new(exchange: Arc<dyn Exchange>, pricer: OrderPricer) -> Self {
        Self { exchange, pricer }
    }

    /// Read balances (and the book for buys) and size the order
    pub async fn plan(&self, direction: Stance, pair: &MarketPair) -> Result<OrderPlan> {
        match direction {
            Stance::Long => {
                let base_balance = self.available(pair.base()).await?;
                let price = self
                    .pricer
                    .quote_buy(self.exchange.as_ref(), pair, base_balance)
                    .await?;
                let quantity = sized(base_balance / price, pair.base())?;

                Ok(OrderPlan {
                    market: pair.clone(),
                    side: OrderSide::Buy,
                    quantity,
                    price: Some(price),
                    reason: format!(
                        "Go long: spend {:.8} {} at {:.8}",
                        base_balance,
                        pair.base(),
                        price
                    ),
                })
            }

            Stance::Short => {
                let market_balance = self.available(pair.market()).await?;
                let quantity = sized(market_balance, pair.market())?;

                Ok(OrderPlan {
                    market: pair.clone(),
                    side: OrderSide::Sell,
                    quantity,
                    price: None,
                    reason: format!("Go short: sell {:.8} {}", quantity, pair.market()),
                })
            }

            Stance::Unknown => Err(FollowerError::InvalidDirection(direction)),
        }
    }

    /// One submission attempt, no retry
    pub async fn submit(&self, plan: &OrderPlan) -> Result<OrderConfirmation> {
        let result = match plan.side {
            OrderSide::Buy => {
                self.exchange
                    .submit_market_buy(&plan.market, plan.quantity)
                    .await
            }
            OrderSide::Sell => {
                self.exchange
                    .submit_market_sell(&plan.market, plan.quantity)
                    .await
            }
        };

        result.map_err(|e| {
            let err = FollowerError::OrderSubmission(format!("{e:#}"));
            tracing::error!(market = %plan.market, side = %plan.side, quantity = plan.quantity, "{}", err);
            err
        })
    }

    pub async fn execute(&self, direction: Stance, pair: &MarketPair) -> Result<OrderConfirmation> {
        let plan = self.plan(direction, pair).await?;
        tracing::info!("{}", plan.reason);
        self.submit(&plan).await
    }

    async fn available(&self, currency: &str) -> Result<f64> {
        let balance = self
            .exchange
            .get_available_balance(currency)
            .await
            .map_err(|e| FollowerError::source_unavailable(format!("balance {currency}"), &e))?;

        if balance <= 0.0 {
            return Err(FollowerError::EmptyBalance {
                currency: currency.to_string(),
            });
        }

        Ok(balance)
    }
}

/// Dust below one quantity step is refused rather than sent as a zero order
fn sized(quantity: f64, currency: &str) -> Result<f64> {
    let quantity = truncate_quantity(quantity);
    if quantity <= 0.0 {
        return Err(FollowerError::EmptyBalance {
            currency: currency.to_string(),
        });
    }
    Ok(quantity)
}
