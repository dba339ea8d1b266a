use serde::Serialize;

use crate::api::Exchange;
use crate::error::{FollowerError, Result};
use crate::models::{BalanceSnapshot, MarketPair, Stance};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PositionReading {
    pub stance: Stance,
    pub balances: Option<BalanceSnapshot>,
    /// Set when either balance query failed
    pub source_error: Option<FollowerError>,
}

/// Infers the account's current stance on a pair from its balances.
///
/// Holding more market currency than base currency counts as long. This is a
/// proxy only: it ignores pending orders, leverage and cost basis, and it will
/// treat any pre-existing funds in the account as part of the position.
pub struct PositionReader;

impl PositionReader {
    /// Equal balances resolve to `Short`
    pub fn stance_from_balances(balances: &BalanceSnapshot) -> Stance {
        if balances.market_balance > balances.base_balance {
            Stance::Long
        } else {
            Stance::Short
        }
    }

    pub async fn read_balances(exchange: &dyn Exchange, pair: &MarketPair) -> Result<BalanceSnapshot> {
        let market_balance = exchange
            .get_available_balance(pair.market())
            .await
            .map_err(|e| FollowerError::source_unavailable(format!("balance {}", pair.market()), &e))?;
        let base_balance = exchange
            .get_available_balance(pair.base())
            .await
            .map_err(|e| FollowerError::source_unavailable(format!("balance {}", pair.base()), &e))?;

        Ok(BalanceSnapshot {
            base_balance,
            market_balance,
        })
    }

    /// Read both balances and derive the stance. A failed query yields
    /// `Unknown`, never a guessed `Long`/`Short`.
    pub async fn read(exchange: &dyn Exchange, pair: &MarketPair) -> PositionReading {
        match Self::read_balances(exchange, pair).await {
            Ok(balances) => {
                let stance = Self::stance_from_balances(&balances);
                tracing::info!(
                    market = %pair,
                    base_balance = balances.base_balance,
                    market_balance = balances.market_balance,
                    %stance,
                    "Exchange position"
                );
                PositionReading {
                    stance,
                    balances: Some(balances),
                    source_error: None,
                }
            }
            Err(err) => {
                tracing::warn!("{}; exchange position is unknown", err);
                PositionReading {
                    stance: Stance::Unknown,
                    balances: None,
                    source_error: Some(err),
                }
            }
        }
    }
}
