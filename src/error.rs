//! Error taxonomy for the balance lookup pipeline

use alloy::primitives::Address;
use thiserror::Error;

/// Coarse classification of a pipeline failure, shown next to the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    UnresolvedName,
    BalanceFetchFailed,
    MetadataFetchFailed,
    ProviderUnavailable,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::UnresolvedName => "unresolved name",
            ErrorKind::BalanceFetchFailed => "balance fetch failed",
            ErrorKind::MetadataFetchFailed => "metadata fetch failed",
            ErrorKind::ProviderUnavailable => "provider unavailable",
        }
    }
}

/// Errors raised by the resolver, the fetcher and the wallet session.
///
/// Provider plumbing reports `anyhow` errors; they are flattened into the
/// message here (with their context chain) at the component boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid ENS or Ethereum address: {name}{}", reason_suffix(.reason))]
    UnresolvedName {
        name: String,
        reason: Option<String>,
    },

    #[error("Error fetching token balances: {0}")]
    BalanceFetchFailed(String),

    #[error("Error fetching metadata for token {contract}: {message}")]
    MetadataFetchFailed { contract: Address, message: String },

    #[error("Wallet unavailable: {0}")]
    ProviderUnavailable(String),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::InvalidInput(_) => ErrorKind::InvalidInput,
            QueryError::UnresolvedName { .. } => ErrorKind::UnresolvedName,
            QueryError::BalanceFetchFailed(_) => ErrorKind::BalanceFetchFailed,
            QueryError::MetadataFetchFailed { .. } => ErrorKind::MetadataFetchFailed,
            QueryError::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_name_message() {
        let err = QueryError::UnresolvedName {
            name: "alice.eth".into(),
            reason: None,
        };
        assert_eq!(err.to_string(), "Invalid ENS or Ethereum address: alice.eth");
        assert_eq!(err.kind(), ErrorKind::UnresolvedName);

        let err = QueryError::UnresolvedName {
            name: "alice.eth".into(),
            reason: Some("rpc timeout".into()),
        };
        assert_eq!(
            err.to_string(),
            "Invalid ENS or Ethereum address: alice.eth (rpc timeout)"
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            QueryError::BalanceFetchFailed("x".into()).kind(),
            ErrorKind::BalanceFetchFailed
        );
        assert_eq!(
            QueryError::MetadataFetchFailed {
                contract: Address::ZERO,
                message: "x".into()
            }
            .kind(),
            ErrorKind::MetadataFetchFailed
        );
        assert_eq!(
            QueryError::ProviderUnavailable("x".into()).kind().label(),
            "provider unavailable"
        );
    }
}
