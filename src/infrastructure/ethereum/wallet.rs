//! Wallet connection through a signer/dev-node JSON-RPC endpoint

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use anyhow::{Context, Result};
use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::error::QueryError;

/// Account access exposed by a wallet
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Ask the wallet to expose an account (`eth_requestAccounts`)
    async fn request_account(&self) -> Result<Address>;

    /// Account already exposed without prompting (`eth_accounts`)
    async fn connected_account(&self) -> Result<Option<Address>>;

    fn endpoint_name(&self) -> String;
}

/// Wallet backed by any JSON-RPC endpoint that manages accounts
pub struct RpcWallet {
    provider: DynProvider,
    endpoint: String,
}

impl RpcWallet {
    pub async fn connect(url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect(url)
            .await
            .with_context(|| format!("Failed to connect to wallet at {}", url))?
            .erased();
        Ok(Self {
            provider,
            endpoint: url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl WalletProvider for RpcWallet {
    async fn request_account(&self) -> Result<Address> {
        let accounts: Vec<Address> = self
            .provider
            .raw_request("eth_requestAccounts".into(), ())
            .await
            .context("eth_requestAccounts failed")?;
        accounts
            .first()
            .copied()
            .context("Wallet returned no accounts")
    }

    async fn connected_account(&self) -> Result<Option<Address>> {
        let accounts = self.provider.get_accounts().await?;
        Ok(accounts.first().copied())
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}

/// The session's view of the wallet: which account, if any, is connected
pub struct WalletSession {
    wallet: Option<Arc<dyn WalletProvider>>,
    connected: Option<Address>,
}

impl WalletSession {
    pub fn new(wallet: Option<Box<dyn WalletProvider>>) -> Self {
        Self {
            wallet: wallet.map(Arc::from),
            connected: None,
        }
    }

    /// Open the configured wallet endpoint, if any
    pub async fn open(rpc: Option<&str>) -> Result<Self> {
        let wallet = match rpc.filter(|r| !r.trim().is_empty()) {
            Some(url) => Some(Box::new(RpcWallet::connect(url.trim()).await?) as Box<dyn WalletProvider>),
            None => None,
        };
        Ok(Self::new(wallet))
    }

    pub fn is_available(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn connected(&self) -> Option<Address> {
        self.connected
    }

    /// Session-start check; quietly yields `None` when no wallet is set up
    pub async fn check_connected(&mut self) -> Option<Address> {
        let wallet = self.wallet.as_ref()?;
        match wallet.connected_account().await {
            Ok(account) => {
                self.connected = account;
                account
            }
            Err(err) => {
                tracing::warn!(endpoint = %wallet.endpoint_name(), "eth_accounts failed: {:#}", err);
                None
            }
        }
    }

    /// Explicit connect action. The returned future holds no borrow of the
    /// session, so a caller can keep serving other work while the wallet
    /// waits on the user; report the account back with [`Self::mark_connected`].
    pub fn request_account(&self) -> BoxFuture<'static, Result<Address, QueryError>> {
        let Some(wallet) = self.wallet.clone() else {
            return future::ready(Err(QueryError::ProviderUnavailable(
                "no wallet endpoint configured (set wallet.rpc or --wallet-rpc)".into(),
            )))
            .boxed();
        };
        async move {
            let account = wallet
                .request_account()
                .await
                .map_err(|err| QueryError::ProviderUnavailable(format!("{:#}", err)))?;
            tracing::info!(%account, endpoint = %wallet.endpoint_name(), "wallet connected");
            Ok(account)
        }
        .boxed()
    }

    pub fn mark_connected(&mut self, account: Address) {
        self.connected = Some(account);
    }
}
