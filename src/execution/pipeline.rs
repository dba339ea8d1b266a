use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::api::{Exchange, PostSource};
use crate::config::FollowerConfig;
use crate::error::FollowerError;
use crate::execution::{decide, OrderPlan, OrderPricer, PositionReader, PositionReading, TradeExecutor};
use crate::models::{OrderConfirmation, Stance, TradeDecision};
use crate::signal::{SentimentExtractor, SentimentReading};

/// What a single run ended up doing
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    NoTrade { reason: String },
    DryRun { plan: OrderPlan },
    Executed { confirmation: OrderConfirmation },
    Failed { error: FollowerError },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunReport {
    pub decision: TradeDecision,
    pub sentiment: SentimentReading,
    pub position: PositionReading,
    pub outcome: RunOutcome,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    SentimentRead,
    PositionRead,
    Decide,
    NoOp,
    Pricing,
    Execute,
    Done,
}

impl Stage {
    /// Only buys consult the order book
    fn after_decide(direction: Stance) -> Stage {
        match direction {
            Stance::Long => Stage::Pricing,
            _ => Stage::Execute,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::SentimentRead => "sentiment_read",
            Stage::PositionRead => "position_read",
            Stage::Decide => "decide",
            Stage::NoOp => "no_op",
            Stage::Pricing => "pricing",
            Stage::Execute => "execute",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Reconciles the exchange account with the latest social signal, once.
///
/// Holds no state between runs; calling [`Follower::run_once`] again simply
/// repeats the whole pass against fresh data.
pub struct Follower {
    posts: Arc<dyn PostSource>,
    executor: TradeExecutor,
    exchange: Arc<dyn Exchange>,
    extractor: SentimentExtractor,
    config: FollowerConfig,
}

impl Follower {
    pub fn new(posts: Arc<dyn PostSource>, exchange: Arc<dyn Exchange>, config: FollowerConfig) -> Self {
        let pricer = OrderPricer::new(config.order_book_depth);
        Self {
            posts,
            executor: TradeExecutor::new(exchange.clone(), pricer),
            exchange,
            extractor: SentimentExtractor::new(config.sentiment_keyword.clone()),
            config,
        }
    }

    pub fn config(&self) -> &FollowerConfig {
        &self.config
    }

    /// Run the pass. Every failure ends up in the report's outcome; this
    /// never returns early with an error.
    pub async fn run_once(&self) -> RunReport {
        let market = &self.config.market;

        tracing::info!(stage = %Stage::SentimentRead, handle = %self.config.account_handle, keyword = %self.config.sentiment_keyword);
        let sentiment = self
            .extractor
            .read(
                self.posts.as_ref(),
                &self.config.account_handle,
                self.config.timeline_window,
            )
            .await;

        tracing::info!(stage = %Stage::PositionRead, %market);
        let position = PositionReader::read(self.exchange.as_ref(), market).await;

        let decision = decide(sentiment.stance, position.stance);
        tracing::info!(
            stage = %Stage::Decide,
            sentiment = %sentiment.stance,
            exchange = %position.stance,
            should_trade = decision.should_trade,
            direction = %decision.direction
        );

        let outcome = if !decision.should_trade {
            let reason = no_trade_reason(&sentiment, &position);
            tracing::info!(stage = %Stage::NoOp, "{}", reason);
            RunOutcome::NoTrade { reason }
        } else {
            self.execute(decision).await
        };

        tracing::info!(stage = %Stage::Done, outcome = ?outcome);
        RunReport {
            decision,
            sentiment,
            position,
            outcome,
        }
    }

    async fn execute(&self, decision: TradeDecision) -> RunOutcome {
        let market = &self.config.market;

        let stage = Stage::after_decide(decision.direction);
        if matches!(stage, Stage::Pricing) {
            tracing::info!(stage = %stage, %market, depth = self.config.order_book_depth);
        }
        let plan = match self.executor.plan(decision.direction, market).await {
            Ok(plan) => plan,
            Err(error) => {
                tracing::warn!(%market, "Trade aborted: {}", error);
                return RunOutcome::Failed { error };
            }
        };
        tracing::info!(stage = %Stage::Execute, side = %plan.side, quantity = plan.quantity, dry_run = self.config.dry_run);

        if self.config.dry_run {
            tracing::info!("Dry run, not submitting: {}", plan.reason);
            return RunOutcome::DryRun { plan };
        }

        tracing::info!("{}", plan.reason);
        match self.executor.submit(&plan).await {
            Ok(confirmation) => RunOutcome::Executed { confirmation },
            Err(error) => RunOutcome::Failed { error },
        }
    }
}

fn no_trade_reason(sentiment: &SentimentReading, position: &PositionReading) -> String {
    if let Some(err) = &sentiment.source_error {
        return format!("Sentiment unavailable: {}", err);
    }
    if let Some(err) = &position.source_error {
        return format!("Exchange position unavailable: {}", err);
    }
    if !sentiment.stance.is_known() {
        return "No resolvable signal in recent posts".to_string();
    }
    format!("Already {}", position.stance)
}
