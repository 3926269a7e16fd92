//! Session-lifetime memo of query results, keyed by the raw query string

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;

use crate::domain::{AggregatedResult, QueryKey, TokenMetadata};

/// A stored result plus its metadata indexed by contract
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub result: Arc<AggregatedResult>,
    pub metadata_by_contract: Arc<HashMap<Address, TokenMetadata>>,
}

impl CachedResult {
    pub fn new(result: Arc<AggregatedResult>) -> Self {
        let metadata_by_contract = Arc::new(result.metadata_index());
        Self {
            result,
            metadata_by_contract,
        }
    }
}

/// Unbounded, no TTL: a stored entry stays valid until the session ends
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<QueryKey, CachedResult>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &QueryKey) -> Option<CachedResult> {
        self.entries.get(key).cloned()
    }

    /// Last write wins
    pub fn store(&mut self, key: QueryKey, value: CachedResult) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    use crate::domain::TokenBalanceRecord;

    fn result(byte: u8) -> Arc<AggregatedResult> {
        let contract = Address::repeat_byte(byte);
        Arc::new(
            AggregatedResult::new(
                Address::ZERO,
                vec![TokenBalanceRecord {
                    contract,
                    balance: U256::from(byte),
                }],
                vec![TokenMetadata {
                    contract,
                    name: None,
                    symbol: Some(format!("T{byte}")),
                    decimals: Some(18),
                    logo: None,
                }],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_lookup_returns_same_instance() {
        let mut cache = ResultCache::new();
        let key = QueryKey::from("alice.eth");
        let stored = result(1);
        cache.store(key.clone(), CachedResult::new(Arc::clone(&stored)));

        let hit = cache.lookup(&key).unwrap();
        assert!(Arc::ptr_eq(&hit.result, &stored));
        assert_eq!(
            hit.metadata_by_contract[&Address::repeat_byte(1)].symbol.as_deref(),
            Some("T1")
        );
    }

    #[test]
    fn test_keys_are_exact_strings() {
        let mut cache = ResultCache::new();
        cache.store(QueryKey::from("alice.eth"), CachedResult::new(result(1)));

        assert!(cache.lookup(&QueryKey::from("Alice.eth")).is_none());
        assert!(cache.lookup(&QueryKey::from("alice.eth ")).is_none());
    }

    #[test]
    fn test_store_overwrites() {
        let mut cache = ResultCache::new();
        let key = QueryKey::from("k");
        cache.store(key.clone(), CachedResult::new(result(1)));
        let second = result(2);
        cache.store(key.clone(), CachedResult::new(Arc::clone(&second)));

        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&cache.lookup(&key).unwrap().result, &second));

        cache.clear();
        assert!(cache.is_empty());
    }
}
