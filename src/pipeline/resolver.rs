//! Query string to on-chain address

use std::sync::Arc;

use alloy::primitives::Address;

use crate::domain::address::{looks_like_hex_address, parse_address};
use crate::domain::QueryKey;
use crate::error::QueryError;
use crate::infrastructure::ethereum::ChainDataProvider;

#[derive(Clone)]
pub struct AddressResolver {
    provider: Arc<dyn ChainDataProvider>,
}

impl AddressResolver {
    pub fn new(provider: Arc<dyn ChainDataProvider>) -> Self {
        Self { provider }
    }

    /// Valid addresses pass through without a network call; anything else is
    /// resolved as a name exactly once.
    pub async fn resolve(&self, key: &QueryKey) -> Result<Address, QueryError> {
        let raw = key.as_str();
        if raw.is_empty() {
            return Err(QueryError::InvalidInput(
                "Please enter an Ethereum address or ENS name".into(),
            ));
        }

        if let Some(address) = parse_address(raw) {
            return Ok(address);
        }

        if looks_like_hex_address(raw) {
            return Err(QueryError::InvalidInput(format!(
                "Malformed address {raw} (expected 0x followed by 40 hex characters)"
            )));
        }

        match self.provider.resolve_name(raw).await {
            Ok(Some(address)) => {
                tracing::debug!(name = raw, %address, "name resolved");
                Ok(address)
            }
            Ok(None) => Err(QueryError::UnresolvedName {
                name: raw.to_string(),
                reason: None,
            }),
            Err(err) => Err(QueryError::UnresolvedName {
                name: raw.to_string(),
                reason: Some(format!("{:#}", err)),
            }),
        }
    }
}
