//! Address-to-balances pipeline
//!
//! input → debounce → (trigger) orchestrator → cache → resolver → fetcher → cache

pub mod cache;
pub mod debounce;
pub mod fetcher;
pub mod orchestrator;
pub mod resolver;

pub use cache::{CachedResult, ResultCache};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use fetcher::BalanceFetcher;
pub use orchestrator::{Begin, Pipeline, QueryOrchestrator, QueryOutcome, QueryTicket};
pub use resolver::AddressResolver;
