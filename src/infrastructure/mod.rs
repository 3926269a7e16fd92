//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based chain data provider and wallet implementations
//! - Tokio runtime bridge for async operations

pub mod ethereum;
pub mod runtime;
