//! ERC-20 token indexer
//!
//! Resolves an address or ENS name, lists the account's ERC-20 balances with
//! token metadata from an Alchemy-compatible provider, and memoizes results
//! per query for the rest of the session.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod pipeline;

pub use domain::{AggregatedResult, QueryKey, QueryState, TokenBalanceRecord, TokenMetadata};
pub use error::{ErrorKind, QueryError};
pub use infrastructure::ethereum::{ChainDataProvider, WalletProvider};
pub use pipeline::{QueryOrchestrator, ResultCache};
