//! Ethereum infrastructure - Alloy-backed data provider and wallet

pub mod ens;
mod provider;
pub(crate) mod types;
mod wallet;

pub use provider::{create_provider, AlchemyProvider, ChainDataProvider, Network, ProviderConfig};
pub use wallet::{RpcWallet, WalletProvider, WalletSession};
