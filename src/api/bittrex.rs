use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha512;

use super::Exchange;
use crate::models::{MarketPair, OrderBookLevel, OrderConfirmation, OrderSide};

// Bittrex REST API v1.1
pub const BITTREX_API_BASE: &str = "https://api.bittrex.com/api/v1.1";

type HmacSha512 = Hmac<Sha512>;

/// Client for the Bittrex spot exchange
///
/// Private endpoints carry `apikey` and `nonce` in the query string and are
/// authenticated by the `apisign` header: hex HMAC-SHA512 of the full URI.
#[derive(Clone)]
pub struct BittrexClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct BittrexResponse<T> {
    success: bool,
    #[serde(default)]
    message: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BalanceData {
    // Null for currencies the account never held
    available: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OrderBookEntry {
    quantity: f64,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct OrderData {
    uuid: String,
}

// ============== Implementation ==============

impl BittrexClient {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self::with_base_url(api_key, api_secret, BITTREX_API_BASE)
    }

    pub fn with_base_url(api_key: String, api_secret: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            api_secret,
        }
    }

    fn sign(&self, uri: &str) -> Result<String> {
        let mut mac = HmacSha512::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| anyhow!("Invalid API secret: {}", e))?;
        mac.update(uri.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// GET a public endpoint, e.g. `public/getorderbook?market=USDT-ETH&type=sell`
    async fn public_get<T: for<'de> Deserialize<'de>>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path_and_query);
        tracing::debug!("GET {}", url);

        let request = self.client.get(&url);
        self.execute(request, path_and_query).await
    }

    /// GET a private endpoint; `path_and_query` must already contain a `?`
    async fn private_get<T: for<'de> Deserialize<'de>>(&self, path_and_query: &str) -> Result<T> {
        let nonce = chrono::Utc::now().timestamp_millis();
        let url = format!(
            "{}/{}&apikey={}&nonce={}",
            self.base_url, path_and_query, self.api_key, nonce
        );
        let signature = self.sign(&url)?;
        tracing::debug!("GET {}/{} (signed)", self.base_url, path_and_query);

        let request = self.client.get(&url).header("apisign", signature);
        self.execute(request, path_and_query).await
    }

    async fn execute<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("request to {endpoint} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Bittrex API error ({}) on {}", status, endpoint);
        }

        let envelope: BittrexResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Bittrex response for {endpoint}"))?;

        if !envelope.success {
            bail!("Bittrex rejected {}: {}", endpoint, envelope.message);
        }

        envelope
            .result
            .ok_or_else(|| anyhow!("Bittrex returned no result for {}", endpoint))
    }

    async fn submit_market_order(
        &self,
        side: OrderSide,
        pair: &MarketPair,
        quantity: f64,
    ) -> Result<OrderConfirmation> {
        let endpoint = match side {
            OrderSide::Buy => "market/buymarket",
            OrderSide::Sell => "market/sellmarket",
        };
        let path = format!("{}?market={}&quantity={:.8}", endpoint, pair, quantity);

        let order: OrderData = self.private_get(&path).await?;

        tracing::info!(
            market = %pair,
            side = %side,
            quantity,
            order_id = %order.uuid,
            "Order accepted"
        );

        Ok(OrderConfirmation {
            order_id: order.uuid,
            market: pair.clone(),
            side,
            quantity,
        })
    }
}

#[async_trait]
impl Exchange for BittrexClient {
    async fn get_available_balance(&self, currency: &str) -> Result<f64> {
        let path = format!("account/getbalance?currency={}", currency);
        let balance: BalanceData = self.private_get(&path).await?;
        Ok(balance.available.unwrap_or(0.0))
    }

    async fn get_sell_order_book(
        &self,
        pair: &MarketPair,
        depth: usize,
    ) -> Result<Vec<OrderBookLevel>> {
        let path = format!("public/getorderbook?market={}&type=sell", pair);
        let entries: Vec<OrderBookEntry> = self.public_get(&path).await?;

        Ok(entries
            .into_iter()
            .take(depth)
            .map(|e| OrderBookLevel::new(e.rate, e.quantity))
            .collect())
    }

    async fn submit_market_buy(
        &self,
        pair: &MarketPair,
        quantity: f64,
    ) -> Result<OrderConfirmation> {
        self.submit_market_order(OrderSide::Buy, pair, quantity).await
    }

    async fn submit_market_sell(
        &self,
        pair: &MarketPair,
        quantity: f64,
    ) -> Result<OrderConfirmation> {
        self.submit_market_order(OrderSide::Sell, pair, quantity).await
    }
}
