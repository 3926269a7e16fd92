//! Token balance and metadata records

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};

use crate::domain::address::{checksum, short_addr};

/// Raw balance of one token held by the queried account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalanceRecord {
    pub contract: Address,
    /// Smallest-unit amount; decimals are not applied
    pub balance: U256,
}

/// Display metadata for a token contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub contract: Address,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub logo: Option<String>,
}

impl TokenMetadata {
    pub fn display_symbol(&self) -> String {
        self.symbol
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| short_addr(&checksum(&self.contract)))
    }
}

/// Balances for one account with index-aligned metadata.
///
/// `balances[i]` and `metadata[i]` always describe the same contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedResult {
    owner: Address,
    balances: Vec<TokenBalanceRecord>,
    metadata: Vec<TokenMetadata>,
    fetched_at: DateTime<Utc>,
}

impl AggregatedResult {
    /// Returns `None` when the two sequences are not index-aligned
    pub fn new(
        owner: Address,
        balances: Vec<TokenBalanceRecord>,
        metadata: Vec<TokenMetadata>,
    ) -> Option<Self> {
        if balances.len() != metadata.len() {
            return None;
        }
        if balances
            .iter()
            .zip(&metadata)
            .any(|(balance, meta)| balance.contract != meta.contract)
        {
            return None;
        }

        Some(Self {
            owner,
            balances,
            metadata,
            fetched_at: Utc::now(),
        })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn balances(&self) -> &[TokenBalanceRecord] {
        &self.balances
    }

    pub fn metadata(&self) -> &[TokenMetadata] {
        &self.metadata
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Aligned (balance, metadata) pairs in provider order
    pub fn rows(&self) -> impl Iterator<Item = (&TokenBalanceRecord, &TokenMetadata)> {
        self.balances.iter().zip(self.metadata.iter())
    }

    /// Metadata keyed by contract
    pub fn metadata_index(&self) -> HashMap<Address, TokenMetadata> {
        self.metadata
            .iter()
            .map(|meta| (meta.contract, meta.clone()))
            .collect()
    }
}

/// Format a raw token amount with its decimals, trimming trailing zeros
pub fn format_token_balance(value: U256, decimals: Option<u8>) -> String {
    let Some(decimals) = decimals else {
        return value.to_string();
    };

    if decimals == 0 {
        return value.to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let frac = value % divisor;

    if frac.is_zero() {
        whole.to_string()
    } else {
        let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
        let trimmed = frac_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

/// Balance as shown in the results grid: four fixed decimal places
pub fn display_balance(value: U256, decimals: Option<u8>) -> String {
    let formatted = format_token_balance(value, decimals);
    match formatted.parse::<f64>() {
        Ok(amount) => format!("{:.4}", amount),
        Err(_) => formatted,
    }
}
