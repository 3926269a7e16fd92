//! Domain layer - addresses, token records and query state

pub mod address;
pub mod query;
pub mod token;

pub use query::{QueryKey, QueryState};
pub use token::{AggregatedResult, TokenBalanceRecord, TokenMetadata};
