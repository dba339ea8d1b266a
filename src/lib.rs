// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod signal;

// Re-export commonly used types
pub use api::{Exchange, PostSource};
pub use error::{FollowerError, Result};
pub use execution::{Follower, RunOutcome, RunReport};
pub use models::*;
