//! Resolver and fetcher against a scripted provider

mod common;

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use common::{addr, lower_hex, token, FakeChain};
use erc20_indexer::pipeline::{AddressResolver, BalanceFetcher};
use erc20_indexer::{ErrorKind, QueryError, QueryKey};

#[tokio::test]
async fn test_valid_address_skips_the_network() {
    let chain = FakeChain::new().into_arc();
    let resolver = AddressResolver::new(chain.clone());

    let owner = addr(0xab);
    let resolved = resolver.resolve(&QueryKey::from(lower_hex(owner))).await.unwrap();

    assert_eq!(resolved, owner);
    assert_eq!(chain.network_calls(), 0);
}

#[tokio::test]
async fn test_name_is_resolved_once() {
    let owner = addr(0xd8);
    let chain = FakeChain::new().with_name("vitalik.eth", owner).into_arc();
    let resolver = AddressResolver::new(chain.clone());

    let resolved = resolver.resolve(&QueryKey::from("vitalik.eth")).await.unwrap();

    assert_eq!(resolved, owner);
    assert_eq!(chain.resolves(), 1);
}

#[tokio::test]
async fn test_unknown_name_is_unresolved() {
    let chain = FakeChain::new().into_arc();
    let resolver = AddressResolver::new(chain.clone());

    let err = resolver.resolve(&QueryKey::from("alice.eth")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnresolvedName);
    assert!(err.to_string().contains("alice.eth"));
    assert_eq!(chain.resolves(), 1);
}

#[tokio::test]
async fn test_resolver_error_keeps_reason() {
    let chain = FakeChain::new().with_failing_name("broken.eth").into_arc();
    let resolver = AddressResolver::new(chain);

    let err = resolver.resolve(&QueryKey::from("broken.eth")).await.unwrap_err();

    match err {
        QueryError::UnresolvedName { name, reason } => {
            assert_eq!(name, "broken.eth");
            assert!(reason.unwrap().contains("resolver reverted"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_and_malformed_input_is_rejected_locally() {
    let chain = FakeChain::new().into_arc();
    let resolver = AddressResolver::new(chain.clone());

    for raw in ["", "0x1234", "0xzz00000000000000000000000000000000000000"] {
        let err = resolver.resolve(&QueryKey::from(raw)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "input {raw:?}");
    }
    assert_eq!(chain.network_calls(), 0);
}

#[tokio::test]
async fn test_whitespace_only_input_is_looked_up_as_a_name() {
    let chain = FakeChain::new().into_arc();
    let resolver = AddressResolver::new(chain.clone());

    let err = resolver.resolve(&QueryKey::from("   ")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnresolvedName);
    assert_eq!(chain.resolves(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_metadata_stays_aligned_when_completions_reorder() {
    let owner = addr(0x01);
    let (usdc, dai, weth) = (addr(0xa1), addr(0xa2), addr(0xa3));
    let chain = FakeChain::new()
        .with_holding(owner, usdc, 1_500_000)
        .with_holding(owner, dai, 42)
        .with_holding(owner, weth, 7)
        .with_token(token(usdc, "USDC", 6))
        .with_token(token(dai, "DAI", 18))
        .with_token(token(weth, "WETH", 18))
        // first request finishes last
        .with_metadata_delay(usdc, Duration::from_millis(300))
        .with_metadata_delay(dai, Duration::from_millis(200))
        .with_metadata_delay(weth, Duration::from_millis(100))
        .into_arc();

    let result = BalanceFetcher::new(chain.clone()).fetch(owner).await.unwrap();

    assert_eq!(*chain.metadata_log.lock().unwrap(), vec![weth, dai, usdc]);
    assert_eq!(result.owner(), owner);
    let symbols: Vec<_> = result.metadata().iter().map(|m| m.display_symbol()).collect();
    assert_eq!(symbols, vec!["USDC", "DAI", "WETH"]);
    for (balance, meta) in result.rows() {
        assert_eq!(balance.contract, meta.contract);
    }
    assert_eq!(result.balances()[0].balance, U256::from(1_500_000u64));
}

#[tokio::test]
async fn test_empty_wallet_fetches_no_metadata() {
    let owner = addr(0x02);
    let chain = FakeChain::new().with_empty_wallet(owner).into_arc();

    let result = BalanceFetcher::new(chain.clone()).fetch(owner).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(chain.metadata_lookups(), 0);
}

#[tokio::test]
async fn test_one_failed_metadata_fails_the_fetch() {
    let owner = addr(0x03);
    let (good, bad) = (addr(0xb1), addr(0xb2));
    let chain = FakeChain::new()
        .with_holding(owner, good, 1)
        .with_holding(owner, bad, 2)
        .with_token(token(good, "GOOD", 18))
        .with_failing_token(bad)
        .into_arc();

    let err = BalanceFetcher::new(chain).fetch(owner).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MetadataFetchFailed);
    match err {
        QueryError::MetadataFetchFailed { contract, .. } => assert_eq!(contract, bad),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_metadata_for_the_wrong_contract_names_the_held_token() {
    let owner = addr(0x08);
    let (held, foreign) = (addr(0xf1), addr(0xf2));
    let chain = FakeChain::new()
        .with_holding(owner, held, 1)
        .with_token_reply(held, token(foreign, "OTHER", 18))
        .into_arc();

    let err = BalanceFetcher::new(chain).fetch(owner).await.unwrap_err();

    match err {
        QueryError::MetadataFetchFailed { contract, message } => {
            assert_eq!(contract, held);
            assert!(message.contains("provider returned metadata for"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_balance_failure_skips_metadata() {
    let owner = addr(0x04);
    let chain = FakeChain::new().with_failing_balances(owner).into_arc();

    let err = BalanceFetcher::new(chain.clone()).fetch(owner).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BalanceFetchFailed);
    assert!(err.to_string().contains("503"));
    assert_eq!(chain.metadata_lookups(), 0);
}

#[tokio::test]
async fn test_duplicate_contracts_share_one_lookup() {
    let owner = addr(0x05);
    let usdc = addr(0xc1);
    let chain = FakeChain::new()
        .with_holding(owner, usdc, 10)
        .with_holding(owner, usdc, 20)
        .with_token(token(usdc, "USDC", 6))
        .into_arc();

    let result = BalanceFetcher::new(chain.clone()).fetch(owner).await.unwrap();

    assert_eq!(chain.metadata_lookups(), 1);
    assert_eq!(result.len(), 2);
    assert!(result.metadata().iter().all(|m| m.contract == usdc));
}

#[tokio::test(start_paused = true)]
async fn test_metadata_requests_run_concurrently() {
    let owner = addr(0x06);
    let mut chain = FakeChain::new();
    for byte in 0xd1..=0xd5 {
        chain = chain
            .with_holding(owner, addr(byte), 1)
            .with_metadata_delay(addr(byte), Duration::from_millis(50));
    }
    let chain = chain.into_arc();

    BalanceFetcher::new(chain.clone()).fetch(owner).await.unwrap();

    assert_eq!(chain.max_in_flight.load(std::sync::atomic::Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_limit_is_respected() {
    let owner = addr(0x07);
    let mut chain = FakeChain::new();
    for byte in 0xe1..=0xe6 {
        chain = chain
            .with_holding(owner, addr(byte), byte as u64)
            .with_metadata_delay(addr(byte), Duration::from_millis(50));
    }
    let chain: Arc<FakeChain> = chain.into_arc();

    let result = BalanceFetcher::new(chain.clone())
        .with_concurrency(Some(2))
        .fetch(owner)
        .await
        .unwrap();

    assert_eq!(chain.max_in_flight.load(std::sync::atomic::Ordering::SeqCst), 2);
    let contracts: Vec<_> = result.metadata().iter().map(|m| m.contract).collect();
    let expected: Vec<_> = (0xe1..=0xe6).map(addr).collect();
    assert_eq!(contracts, expected);
}
