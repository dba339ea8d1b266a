use crate::models::{Stance, TradeDecision};

/// Compare the signal against the account.
///
/// The sentiment stance is authoritative and is always the direction; the
/// exchange stance only says whether we already hold it. Either side being
/// `Unknown` means no trade.
pub fn decide(sentiment: Stance, exchange: Stance) -> TradeDecision {
    let should_trade = sentiment.is_known() && exchange.is_known() && sentiment != exchange;

    TradeDecision {
        should_trade,
        direction: sentiment,
    }
}
