//! Scripted chain data provider for pipeline tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use anyhow::{bail, Result};

use erc20_indexer::{ChainDataProvider, TokenBalanceRecord, TokenMetadata};

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn lower_hex(address: Address) -> String {
    format!("0x{}", hex::encode(address))
}

pub fn token(contract: Address, symbol: &str, decimals: u8) -> TokenMetadata {
    TokenMetadata {
        contract,
        name: Some(format!("{symbol} Token")),
        symbol: Some(symbol.to_string()),
        decimals: Some(decimals),
        logo: None,
    }
}

#[derive(Default)]
pub struct FakeChain {
    names: HashMap<String, Address>,
    name_errors: HashSet<String>,
    holdings: HashMap<Address, Vec<TokenBalanceRecord>>,
    balance_errors: HashSet<Address>,
    balance_delays: HashMap<Address, Duration>,
    tokens: HashMap<Address, TokenMetadata>,
    metadata_errors: HashSet<Address>,
    metadata_delays: HashMap<Address, Duration>,

    pub resolve_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub metadata_log: Mutex<Vec<Address>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str, address: Address) -> Self {
        self.names.insert(name.to_string(), address);
        self
    }

    pub fn with_failing_name(mut self, name: &str) -> Self {
        self.name_errors.insert(name.to_string());
        self
    }

    pub fn with_holding(mut self, owner: Address, contract: Address, balance: u64) -> Self {
        self.holdings.entry(owner).or_default().push(TokenBalanceRecord {
            contract,
            balance: U256::from(balance),
        });
        self
    }

    pub fn with_empty_wallet(mut self, owner: Address) -> Self {
        self.holdings.entry(owner).or_default();
        self
    }

    pub fn with_failing_balances(mut self, owner: Address) -> Self {
        self.balance_errors.insert(owner);
        self
    }

    pub fn with_balance_delay(mut self, owner: Address, delay: Duration) -> Self {
        self.balance_delays.insert(owner, delay);
        self
    }

    pub fn with_token(mut self, metadata: TokenMetadata) -> Self {
        self.tokens.insert(metadata.contract, metadata);
        self
    }

    /// Answer lookups for `contract` with `metadata`, whatever contract it names
    pub fn with_token_reply(mut self, contract: Address, metadata: TokenMetadata) -> Self {
        self.tokens.insert(contract, metadata);
        self
    }

    pub fn with_failing_token(mut self, contract: Address) -> Self {
        self.metadata_errors.insert(contract);
        self
    }

    pub fn with_metadata_delay(mut self, contract: Address, delay: Duration) -> Self {
        self.metadata_delays.insert(contract, delay);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn resolves(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn balance_lookups(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_lookups(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.resolves() + self.balance_lookups() + self.metadata_lookups()
    }
}

#[async_trait::async_trait]
impl ChainDataProvider for FakeChain {
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.name_errors.contains(name) {
            bail!("resolver reverted");
        }
        Ok(self.names.get(name).copied())
    }

    async fn token_balances(&self, owner: Address) -> Result<Vec<TokenBalanceRecord>> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.balance_delays.get(&owner) {
            tokio::time::sleep(*delay).await;
        }
        if self.balance_errors.contains(&owner) {
            bail!("upstream returned 503");
        }
        Ok(self.holdings.get(&owner).cloned().unwrap_or_default())
    }

    async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.metadata_delays.get(&contract) {
            tokio::time::sleep(*delay).await;
        }
        self.metadata_log.lock().unwrap().push(contract);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.metadata_errors.contains(&contract) {
            bail!("metadata unavailable");
        }
        Ok(self.tokens.get(&contract).cloned().unwrap_or(TokenMetadata {
            contract,
            name: None,
            symbol: None,
            decimals: None,
            logo: None,
        }))
    }

    fn endpoint_name(&self) -> String {
        "fake".to_string()
    }
}
