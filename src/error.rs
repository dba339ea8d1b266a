//! Failure kinds of a reconciliation run.
//!
//! Collaborator faults arrive as `anyhow::Error` and are converted into one of
//! these variants by the component that made the call, so a run always ends
//! with a typed outcome instead of an unwound fault.

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::models::Stance;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FollowerError {
    /// Timeline, balance or order-book query failed.
    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// No single resting sell order can absorb the buy.
    #[error("insufficient book depth: need a level above {required:.8}, deepest level holds {available:.8}")]
    InsufficientBookDepth { required: f64, available: f64 },

    /// Only `Long` and `Short` can be traded.
    #[error("invalid trade direction: {0}")]
    InvalidDirection(Stance),

    /// Sized order would be zero or negative.
    #[error("no {currency} balance available to trade")]
    EmptyBalance { currency: String },

    #[error("order submission failed: {0}")]
    OrderSubmission(String),

    #[error("invalid market pair '{0}', expected BASE-MARKET")]
    InvalidMarketPair(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl FollowerError {
    pub fn source_unavailable(source_name: impl Into<String>, err: &anyhow::Error) -> Self {
        FollowerError::SourceUnavailable {
            source_name: source_name.into(),
            reason: format!("{err:#}"),
        }
    }
}

// Reports carry errors as their display message
impl Serialize for FollowerError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub type Result<T> = std::result::Result<T, FollowerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_keeps_context_chain() {
        let err = anyhow::anyhow!("connection refused").context("GET /getbalance");
        let converted = FollowerError::source_unavailable("balance USDT", &err);

        let message = converted.to_string();
        assert!(message.starts_with("balance USDT unavailable"));
        assert!(message.contains("GET /getbalance"));
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn test_serializes_as_message() {
        let err = FollowerError::EmptyBalance {
            currency: "USDT".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            "\"no USDT balance available to trade\""
        );
    }

    #[test]
    fn test_invalid_direction_message() {
        let err = FollowerError::InvalidDirection(Stance::Unknown);
        assert_eq!(err.to_string(), "invalid trade direction: unknown");
    }
}
