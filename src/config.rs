//! Runtime settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `FOLLOWBOT_*` environment variables (highest precedence).

use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::api::bittrex::BITTREX_API_BASE;
use crate::api::twitter::TWITTER_API_BASE;
use crate::error::{FollowerError, Result};
use crate::execution::DEFAULT_BOOK_DEPTH;
use crate::models::MarketPair;

pub const ENV_PREFIX: &str = "FOLLOWBOT";
const DEFAULT_CONFIG_FILE: &str = "followbot";

const DEFAULT_ACCOUNT_HANDLE: &str = "Vickicryptobot";
// The social feed and the exchange name the same instrument differently
const DEFAULT_SENTIMENT_KEYWORD: &str = "ETHUSD";
const DEFAULT_EXCHANGE_MARKET: &str = "USDT-ETH";
const DEFAULT_TIMELINE_WINDOW: usize = 10;

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub account_handle: String,
    pub sentiment_keyword: String,
    pub exchange_market: String,
    pub timeline_window: usize,
    pub order_book_depth: usize,
    pub dry_run: bool,
    pub twitter_base_url: String,
    pub bittrex_base_url: String,
    pub twitter_bearer_token: Option<String>,
    pub bittrex_api_key: Option<String>,
    pub bittrex_api_secret: Option<String>,
}

/// Validated view of [`Settings`] consumed by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct FollowerConfig {
    pub account_handle: String,
    pub sentiment_keyword: String,
    pub market: MarketPair,
    pub timeline_window: usize,
    pub order_book_depth: usize,
    pub dry_run: bool,
}

pub struct Credentials {
    pub twitter_bearer_token: String,
    pub bittrex_api_key: String,
    pub bittrex_api_secret: String,
}

impl Settings {
    /// Load from `path` (must exist) or from `./followbot.toml` if present,
    /// then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = defaults()?.add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| FollowerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<FollowerConfig> {
        if self.account_handle.trim().is_empty() {
            return Err(FollowerError::Config("account_handle is empty".into()));
        }
        if self.sentiment_keyword.is_empty() {
            return Err(FollowerError::Config("sentiment_keyword is empty".into()));
        }
        if self.timeline_window == 0 {
            return Err(FollowerError::Config("timeline_window must be at least 1".into()));
        }
        if self.order_book_depth == 0 {
            return Err(FollowerError::Config("order_book_depth must be at least 1".into()));
        }
        let market: MarketPair = self.exchange_market.parse()?;

        Ok(FollowerConfig {
            account_handle: self.account_handle.trim_start_matches('@').to_string(),
            sentiment_keyword: self.sentiment_keyword.clone(),
            market,
            timeline_window: self.timeline_window,
            order_book_depth: self.order_book_depth,
            dry_run: self.dry_run,
        })
    }

    /// Balances are read even in dry-run mode, so all three are always needed
    pub fn credentials(&self) -> Result<Credentials> {
        fn required(value: &Option<String>, name: &str) -> Result<String> {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    FollowerError::Config(format!(
                        "{} not set (env {}_{})",
                        name,
                        ENV_PREFIX,
                        name.to_uppercase()
                    ))
                })
        }

        Ok(Credentials {
            twitter_bearer_token: required(&self.twitter_bearer_token, "twitter_bearer_token")?,
            bittrex_api_key: required(&self.bittrex_api_key, "bittrex_api_key")?,
            bittrex_api_secret: required(&self.bittrex_api_secret, "bittrex_api_secret")?,
        })
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    let builder = ::config::Config::builder()
        .set_default("account_handle", DEFAULT_ACCOUNT_HANDLE)
        .and_then(|b| b.set_default("sentiment_keyword", DEFAULT_SENTIMENT_KEYWORD))
        .and_then(|b| b.set_default("exchange_market", DEFAULT_EXCHANGE_MARKET))
        .and_then(|b| b.set_default("timeline_window", DEFAULT_TIMELINE_WINDOW as i64))
        .and_then(|b| b.set_default("order_book_depth", DEFAULT_BOOK_DEPTH as i64))
        .and_then(|b| b.set_default("dry_run", false))
        .and_then(|b| b.set_default("twitter_base_url", TWITTER_API_BASE))
        .and_then(|b| b.set_default("bittrex_base_url", BITTREX_API_BASE))
        .map_err(|e| FollowerError::Config(e.to_string()))?;
    Ok(builder)
}

fn redact(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("account_handle", &self.account_handle)
            .field("sentiment_keyword", &self.sentiment_keyword)
            .field("exchange_market", &self.exchange_market)
            .field("timeline_window", &self.timeline_window)
            .field("order_book_depth", &self.order_book_depth)
            .field("dry_run", &self.dry_run)
            .field("twitter_base_url", &self.twitter_base_url)
            .field("bittrex_base_url", &self.bittrex_base_url)
            .field("twitter_bearer_token", &redact(&self.twitter_bearer_token))
            .field("bittrex_api_key", &redact(&self.bittrex_api_key))
            .field("bittrex_api_secret", &redact(&self.bittrex_api_secret))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        let builder = defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml));
        Settings::build(builder).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = from_toml("");
        let config = settings.validate().unwrap();

        assert_eq!(config.account_handle, "Vickicryptobot");
        assert_eq!(config.sentiment_keyword, "ETHUSD");
        assert_eq!(config.market.to_string(), "USDT-ETH");
        assert_eq!(config.timeline_window, 10);
        assert_eq!(config.order_book_depth, 20);
        assert!(!config.dry_run);
        assert_eq!(settings.twitter_base_url, TWITTER_API_BASE);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let settings = from_toml(
            r#"
            account_handle = "@someone"
            sentiment_keyword = "BTCUSD"
            exchange_market = "USDT-BTC"
            timeline_window = 25
            dry_run = true
            "#,
        );
        let config = settings.validate().unwrap();

        assert_eq!(config.account_handle, "someone");
        assert_eq!(config.market.market(), "BTC");
        assert_eq!(config.timeline_window, 25);
        assert!(config.dry_run);
    }

    #[test]
    fn test_rejects_malformed_market() {
        let settings = from_toml(r#"exchange_market = "ETHUSDT""#);
        assert!(matches!(
            settings.validate(),
            Err(FollowerError::InvalidMarketPair(_))
        ));
    }

    #[test]
    fn test_rejects_zero_window() {
        let settings = from_toml("timeline_window = 0");
        assert!(matches!(settings.validate(), Err(FollowerError::Config(_))));
    }

    #[test]
    fn test_missing_credentials() {
        let settings = from_toml(r#"twitter_bearer_token = "abc""#);
        match settings.credentials() {
            Err(FollowerError::Config(msg)) => {
                assert!(msg.contains("bittrex_api_key"));
                assert!(msg.contains("FOLLOWBOT_BITTREX_API_KEY"));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("credentials should be incomplete"),
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = from_toml(
            r#"
            twitter_bearer_token = "tok-123"
            bittrex_api_key = "key-456"
            bittrex_api_secret = "sec-789"
            "#,
        );
        let debug = format!("{:?}", settings);

        assert!(!debug.contains("tok-123"));
        assert!(!debug.contains("key-456"));
        assert!(!debug.contains("sec-789"));
        assert!(debug.contains("<redacted>"));
        assert!(settings.credentials().is_ok());
    }

    // The only test that touches the process environment
    #[test]
    fn test_env_overrides_defaults() {
        std::env::set_var("FOLLOWBOT_ACCOUNT_HANDLE", "someone_else");
        std::env::set_var("FOLLOWBOT_DRY_RUN", "true");
        std::env::set_var("FOLLOWBOT_TWITTER_BEARER_TOKEN", "env-token");

        let loaded = Settings::load(None);

        std::env::remove_var("FOLLOWBOT_ACCOUNT_HANDLE");
        std::env::remove_var("FOLLOWBOT_DRY_RUN");
        std::env::remove_var("FOLLOWBOT_TWITTER_BEARER_TOKEN");

        let settings = loaded.unwrap();
        assert_eq!(settings.account_handle, "someone_else");
        assert!(settings.dry_run);
        assert_eq!(settings.twitter_bearer_token.as_deref(), Some("env-token"));
        // Untouched keys keep their defaults
        assert_eq!(settings.sentiment_keyword, "ETHUSD");
        assert_eq!(settings.timeline_window, 10);
    }
}
