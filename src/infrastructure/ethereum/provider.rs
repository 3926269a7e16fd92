//! Chain data provider abstraction and the Alchemy-backed implementation
//!
//! Token balances and metadata come from Alchemy's enhanced JSON-RPC methods;
//! ENS names are resolved with plain `eth_call`s so any archive node works.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};

use crate::domain::{TokenBalanceRecord, TokenMetadata};
use crate::infrastructure::ethereum::ens::{
    decode_address_word, encode_node_call, namehash, normalize_name, ADDR_SELECTOR,
    ENS_REGISTRY, RESOLVER_SELECTOR,
};
use crate::infrastructure::ethereum::types::{
    convert_balances, convert_metadata, RawTokenMetadata, TokenBalancesResponse,
};

/// Alchemy network slugs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    EthMainnet,
    #[default]
    EthSepolia,
    EthHolesky,
    ArbMainnet,
    OptMainnet,
    BaseMainnet,
    PolygonMainnet,
}

impl Network {
    pub fn slug(&self) -> &'static str {
        match self {
            Network::EthMainnet => "eth-mainnet",
            Network::EthSepolia => "eth-sepolia",
            Network::EthHolesky => "eth-holesky",
            Network::ArbMainnet => "arb-mainnet",
            Network::OptMainnet => "opt-mainnet",
            Network::BaseMainnet => "base-mainnet",
            Network::PolygonMainnet => "polygon-mainnet",
        }
    }

    pub fn all() -> &'static [Network] {
        &[
            Network::EthMainnet,
            Network::EthSepolia,
            Network::EthHolesky,
            Network::ArbMainnet,
            Network::OptMainnet,
            Network::BaseMainnet,
            Network::PolygonMainnet,
        ]
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Network::all()
            .iter()
            .copied()
            .find(|n| n.slug() == wanted)
            .with_context(|| {
                let known: Vec<&str> = Network::all().iter().map(|n| n.slug()).collect();
                format!("Unknown network '{}' (expected one of {})", s, known.join(", "))
            })
    }
}

/// Provider configuration, loaded once at session start
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Full JSON-RPC URL; takes precedence over network + api key
    pub endpoint: Option<String>,
    pub network: Network,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    /// The URL requests go to
    pub fn url(&self) -> Result<String> {
        if let Some(endpoint) = self.endpoint.as_ref().filter(|e| !e.trim().is_empty()) {
            return Ok(endpoint.trim().to_string());
        }
        let api_key = self
            .api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .context("No data provider configured: set provider.api_key or provider.endpoint")?;
        Ok(format!(
            "https://{}.g.alchemy.com/v2/{}",
            self.network.slug(),
            api_key.trim()
        ))
    }

    /// Get display name for this endpoint, with the api key masked
    pub fn display(&self) -> String {
        match self.url() {
            Ok(url) => match self.api_key.as_deref().filter(|k| !k.is_empty()) {
                Some(key) => url.replace(key, "***"),
                None => url,
            },
            Err(_) => format!("{} (unconfigured)", self.network),
        }
    }
}

/// Remote source of names, balances and token metadata
#[async_trait::async_trait]
pub trait ChainDataProvider: Send + Sync + 'static {
    /// Resolve a human-readable name; `None` when the name has no address
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>>;

    /// All ERC-20 balances held by `owner`, in provider order
    async fn token_balances(&self, owner: Address) -> Result<Vec<TokenBalanceRecord>>;

    /// Symbol, decimals and logo for one token contract
    async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

/// Alchemy JSON-RPC over HTTP or WebSocket
pub struct AlchemyProvider {
    provider: DynProvider,
    endpoint: String,
}

/// Create a provider from configuration
pub async fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn ChainDataProvider>> {
    let url = config.url()?;
    let provider = ProviderBuilder::new()
        .connect(&url)
        .await
        .with_context(|| format!("Failed to connect to {}", config.display()))?
        .erased();

    tracing::info!(endpoint = %config.display(), "data provider ready");

    Ok(Arc::new(AlchemyProvider {
        provider,
        endpoint: config.display(),
    }))
}

impl AlchemyProvider {
    /// eth_call returning a single address word
    async fn call_address(&self, to: Address, calldata: Vec<u8>) -> Result<Option<Address>> {
        let request = TransactionRequest::default().to(to).input(calldata.into());
        let data = self.provider.call(request).await?;
        Ok(decode_address_word(&data))
    }
}

#[async_trait::async_trait]
impl ChainDataProvider for AlchemyProvider {
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>> {
        let node = namehash(&normalize_name(name));

        let resolver = self
            .call_address(ENS_REGISTRY, encode_node_call(RESOLVER_SELECTOR, node))
            .await
            .context("ENS registry lookup failed")?;
        let Some(resolver) = resolver else {
            tracing::debug!(name, "name has no resolver");
            return Ok(None);
        };

        self.call_address(resolver, encode_node_call(ADDR_SELECTOR, node))
            .await
            .context("ENS resolver lookup failed")
    }

    async fn token_balances(&self, owner: Address) -> Result<Vec<TokenBalanceRecord>> {
        let response: TokenBalancesResponse = self
            .provider
            .raw_request("alchemy_getTokenBalances".into(), (owner, "erc20"))
            .await
            .context("alchemy_getTokenBalances failed")?;
        convert_balances(response)
    }

    async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata> {
        let raw: Option<RawTokenMetadata> = self
            .provider
            .raw_request("alchemy_getTokenMetadata".into(), (contract,))
            .await
            .context("alchemy_getTokenMetadata failed")?;
        Ok(convert_metadata(contract, raw.unwrap_or_default()))
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}
