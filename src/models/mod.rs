use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FollowerError;

/// Directional bias inferred from either the social feed or the exchange account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Long,
    Short,
    Unknown,
}

impl Stance {
    pub fn is_known(&self) -> bool {
        !matches!(self, Stance::Unknown)
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stance::Long => write!(f, "long"),
            Stance::Short => write!(f, "short"),
            Stance::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single social-media message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: String,
    pub text: String,
}

impl Post {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Exchange trading pair in `BASE-MARKET` notation, e.g. `USDT-ETH`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarketPair {
    base: String,
    market: String,
}

impl MarketPair {
    /// Currency spent to acquire the market currency
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Asset bought and sold against the base currency
    pub fn market(&self) -> &str {
        &self.market
    }
}

impl FromStr for MarketPair {
    type Err = FollowerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(market), None) if !base.is_empty() && !market.is_empty() => {
                Ok(Self {
                    base: base.to_string(),
                    market: market.to_string(),
                })
            }
            _ => Err(FollowerError::InvalidMarketPair(s.to_string())),
        }
    }
}

impl TryFrom<String> for MarketPair {
    type Error = FollowerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MarketPair> for String {
    fn from(pair: MarketPair) -> Self {
        pair.to_string()
    }
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.market)
    }
}

/// Available balances for both legs of a pair, read at one point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BalanceSnapshot {
    pub base_balance: f64,
    pub market_balance: f64,
}

/// Resting sell order: `rate` in base currency per unit, `quantity` in market currency
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrderBookLevel {
    pub rate: f64,
    pub quantity: f64,
}

impl OrderBookLevel {
    pub fn new(rate: f64, quantity: f64) -> Self {
        Self { rate, quantity }
    }

    /// Value of the level in base currency
    pub fn notional(&self) -> f64 {
        self.rate * self.quantity
    }
}

/// Output of reconciliation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradeDecision {
    pub should_trade: bool,
    pub direction: Stance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Exchange acknowledgement of a submitted order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub market: MarketPair,
    pub side: OrderSide,
    pub quantity: f64,
}
