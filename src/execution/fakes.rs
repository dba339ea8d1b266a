//! Deterministic collaborators for unit tests.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::{Exchange, PostSource};
use crate::models::{MarketPair, OrderBookLevel, OrderConfirmation, OrderSide, Post};

#[derive(Default)]
pub struct FakeExchange {
    balances: HashMap<String, f64>,
    book: Vec<OrderBookLevel>,
    book_fails: bool,
    reject_with: Option<String>,
    balance_requests: AtomicUsize,
    book_requests: AtomicUsize,
    submitted: Mutex<Vec<(OrderSide, f64)>>,
}

impl FakeExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, currency: &str, amount: f64) -> Self {
        self.balances.insert(currency.to_string(), amount);
        self
    }

    pub fn with_book(mut self, book: Vec<OrderBookLevel>) -> Self {
        self.book = book;
        self
    }

    pub fn failing_book(mut self) -> Self {
        self.book_fails = true;
        self
    }

    pub fn rejecting_orders(mut self, message: &str) -> Self {
        self.reject_with = Some(message.to_string());
        self
    }

    pub fn balance_requests(&self) -> usize {
        self.balance_requests.load(Ordering::SeqCst)
    }

    pub fn book_requests(&self) -> usize {
        self.book_requests.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<(OrderSide, f64)> {
        self.submitted.lock().unwrap().clone()
    }

    fn submit(&self, side: OrderSide, pair: &MarketPair, quantity: f64) -> Result<OrderConfirmation> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((side, quantity));

        if let Some(message) = &self.reject_with {
            bail!("Bittrex rejected market order: {}", message);
        }

        Ok(OrderConfirmation {
            order_id: format!("order-{}", submitted.len()),
            market: pair.clone(),
            side,
            quantity,
        })
    }
}

#[async_trait]
impl Exchange for FakeExchange {
    async fn get_available_balance(&self, currency: &str) -> Result<f64> {
        self.balance_requests.fetch_add(1, Ordering::SeqCst);
        self.balances
            .get(currency)
            .copied()
            .ok_or_else(|| anyhow!("no balance for {}", currency))
    }

    async fn get_sell_order_book(&self, _pair: &MarketPair, depth: usize) -> Result<Vec<OrderBookLevel>> {
        self.book_requests.fetch_add(1, Ordering::SeqCst);
        if self.book_fails {
            bail!("order book request timed out");
        }
        Ok(self.book.iter().take(depth).copied().collect())
    }

    async fn submit_market_buy(&self, pair: &MarketPair, quantity: f64) -> Result<OrderConfirmation> {
        self.submit(OrderSide::Buy, pair, quantity)
    }

    async fn submit_market_sell(&self, pair: &MarketPair, quantity: f64) -> Result<OrderConfirmation> {
        self.submit(OrderSide::Sell, pair, quantity)
    }
}

/// Timeline that either returns fixed posts or fails
pub struct FakeTimeline {
    posts: Option<Vec<Post>>,
}

impl FakeTimeline {
    pub fn new(texts: &[&str]) -> Self {
        let posts = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Post::new(format!("{}", 100 - i), *text))
            .collect();
        Self { posts: Some(posts) }
    }

    pub fn failing() -> Self {
        Self { posts: None }
    }
}

#[async_trait]
impl PostSource for FakeTimeline {
    async fn fetch_recent_posts(&self, _handle: &str, limit: usize) -> Result<Vec<Post>> {
        match &self.posts {
            Some(posts) => Ok(posts.iter().take(limit).cloned().collect()),
            None => bail!("Twitter API error (401 Unauthorized)"),
        }
    }
}
