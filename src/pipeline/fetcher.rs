//! Balance listing plus concurrent per-token metadata

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy::primitives::Address;
use futures::future::try_join_all;
use futures::{stream, StreamExt, TryStreamExt};

use crate::domain::{AggregatedResult, TokenBalanceRecord, TokenMetadata};
use crate::error::QueryError;
use crate::infrastructure::ethereum::ChainDataProvider;

#[derive(Clone)]
pub struct BalanceFetcher {
    provider: Arc<dyn ChainDataProvider>,
    /// Max metadata requests in flight; `None` sends them all at once
    concurrency: Option<usize>,
}

impl BalanceFetcher {
    pub fn new(provider: Arc<dyn ChainDataProvider>) -> Self {
        Self {
            provider,
            concurrency: None,
        }
    }

    pub fn with_concurrency(mut self, limit: Option<usize>) -> Self {
        self.concurrency = limit.map(|l| l.max(1));
        self
    }

    /// All-or-nothing: any failing metadata request fails the whole fetch.
    /// Metadata comes back index-aligned with the balance list.
    pub async fn fetch(&self, owner: Address) -> Result<AggregatedResult, QueryError> {
        let balances = self
            .provider
            .token_balances(owner)
            .await
            .map_err(|err| QueryError::BalanceFetchFailed(format!("{:#}", err)))?;

        let contracts = distinct_contracts(&balances);
        tracing::debug!(
            %owner,
            balances = balances.len(),
            distinct = contracts.len(),
            "fetching token metadata"
        );

        let fetched: Vec<TokenMetadata> = match self.concurrency {
            None => try_join_all(contracts.iter().map(|c| self.metadata(*c))).await?,
            Some(limit) => {
                stream::iter(contracts.iter().copied())
                    .map(|c| self.metadata(c))
                    .buffered(limit)
                    .try_collect()
                    .await?
            }
        };

        let by_contract: HashMap<Address, TokenMetadata> =
            contracts.into_iter().zip(fetched).collect();
        let metadata = balances
            .iter()
            .map(|b| {
                by_contract
                    .get(&b.contract)
                    .cloned()
                    .ok_or_else(|| QueryError::MetadataFetchFailed {
                        contract: b.contract,
                        message: "no metadata returned".into(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // every row was checked above, so the lengths and contracts line up
        AggregatedResult::new(owner, balances, metadata).ok_or_else(|| {
            QueryError::BalanceFetchFailed(format!(
                "could not align token metadata for {owner}"
            ))
        })
    }

    /// The provider must describe the contract that was asked for
    async fn metadata(&self, contract: Address) -> Result<TokenMetadata, QueryError> {
        let metadata = self
            .provider
            .token_metadata(contract)
            .await
            .map_err(|err| QueryError::MetadataFetchFailed {
                contract,
                message: format!("{:#}", err),
            })?;

        if metadata.contract != contract {
            return Err(QueryError::MetadataFetchFailed {
                contract,
                message: format!("provider returned metadata for {}", metadata.contract),
            });
        }
        Ok(metadata)
    }
}

/// Contracts in first-seen order, duplicates dropped
fn distinct_contracts(balances: &[TokenBalanceRecord]) -> Vec<Address> {
    let mut seen = HashSet::new();
    balances
        .iter()
        .map(|b| b.contract)
        .filter(|c| seen.insert(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    #[test]
    fn test_distinct_contracts_keeps_first_seen_order() {
        let record = |byte: u8| TokenBalanceRecord {
            contract: Address::repeat_byte(byte),
            balance: U256::ZERO,
        };
        let balances = vec![record(3), record(1), record(3), record(2), record(1)];
        assert_eq!(
            distinct_contracts(&balances),
            vec![
                Address::repeat_byte(3),
                Address::repeat_byte(1),
                Address::repeat_byte(2)
            ]
        );
    }
}
