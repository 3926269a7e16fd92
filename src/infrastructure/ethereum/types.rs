//! Alchemy token API responses and their conversion into domain records

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::address::parse_address;
use crate::domain::{TokenBalanceRecord, TokenMetadata};

/// `alchemy_getTokenBalances` result
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalancesResponse {
    #[serde(default)]
    pub token_balances: Vec<RawTokenBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenBalance {
    pub contract_address: String,
    #[serde(default)]
    pub token_balance: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// `alchemy_getTokenMetadata` result; every field is nullable upstream
#[derive(Debug, Default, Deserialize)]
pub struct RawTokenMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u64>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Convert a balances response, keeping provider order.
///
/// Entries that carry an error and no balance are skipped.
pub fn convert_balances(response: TokenBalancesResponse) -> Result<Vec<TokenBalanceRecord>> {
    let mut records = Vec::with_capacity(response.token_balances.len());

    for raw in response.token_balances {
        let contract = parse_address(&raw.contract_address)
            .with_context(|| format!("Invalid contract address {}", raw.contract_address))?;

        let Some(balance_hex) = raw.token_balance else {
            if let Some(error) = raw.error.filter(|e| !e.is_null()) {
                tracing::warn!(%contract, %error, "skipping token balance with provider error");
            }
            continue;
        };

        let balance = parse_hex_u256(&balance_hex)
            .with_context(|| format!("Invalid balance {} for {}", balance_hex, contract))?;
        records.push(TokenBalanceRecord { contract, balance });
    }

    Ok(records)
}

pub fn convert_metadata(contract: Address, raw: RawTokenMetadata) -> TokenMetadata {
    TokenMetadata {
        contract,
        name: raw.name.filter(|s| !s.is_empty()),
        symbol: raw.symbol.filter(|s| !s.is_empty()),
        decimals: raw.decimals.and_then(|d| u8::try_from(d).ok()),
        logo: raw.logo.filter(|s| !s.is_empty()),
    }
}

/// Hex quantity as returned by the provider; `0x` alone is zero
fn parse_hex_u256(s: &str) -> Result<U256> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|err| anyhow::anyhow!("{}", err))
}
