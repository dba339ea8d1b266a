// Position reconciliation and order execution module
pub mod executor;
pub mod pipeline;
pub mod position;
pub mod pricer;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod fakes;

pub use executor::{truncate_quantity, OrderPlan, TradeExecutor};
pub use pipeline::{Follower, RunOutcome, RunReport};
pub use position::{PositionReader, PositionReading};
pub use pricer::{OrderPricer, DEFAULT_BOOK_DEPTH};
pub use reconcile::decide;
