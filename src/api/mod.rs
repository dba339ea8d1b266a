pub mod bittrex;
pub mod twitter;

pub use bittrex::BittrexClient;
pub use twitter::TwitterClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{MarketPair, OrderBookLevel, OrderConfirmation, Post};

/// Source of an account's recent social posts
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Most recent posts first, at most `limit` of them
    async fn fetch_recent_posts(&self, handle: &str, limit: usize) -> Result<Vec<Post>>;
}

/// Account and market access on a spot exchange
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Available (not reserved) quantity of `currency`
    async fn get_available_balance(&self, currency: &str) -> Result<f64>;

    /// Sell side of the book, best (lowest) rate first, at most `depth` levels
    async fn get_sell_order_book(
        &self,
        pair: &MarketPair,
        depth: usize,
    ) -> Result<Vec<OrderBookLevel>>;

    async fn submit_market_buy(&self, pair: &MarketPair, quantity: f64)
        -> Result<OrderConfirmation>;

    async fn submit_market_sell(
        &self,
        pair: &MarketPair,
        quantity: f64,
    ) -> Result<OrderConfirmation>;
}
