//! ENS name resolution helpers (EIP-137)
//!
//! Resolution is two `eth_call`s: the registry's `resolver(bytes32)` for the
//! name's node, then the resolver's `addr(bytes32)`.

use alloy::primitives::{address, keccak256, Address, B256};

/// ENS registry, same address on mainnet and the public testnets
pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

/// resolver(bytes32): 0x0178b8bf
pub const RESOLVER_SELECTOR: [u8; 4] = [0x01, 0x78, 0xb8, 0xbf];

/// addr(bytes32): 0x3b3b57de
pub const ADDR_SELECTOR: [u8; 4] = [0x3b, 0x3b, 0x57, 0xde];

/// Compute the namehash of an already normalized name
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buf);
    }

    node
}

/// ASCII-only normalization: trim and lowercase. Full UTS-46 is not applied.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Encode a `fn(bytes32)` call
pub fn encode_node_call(selector: [u8; 4], node: B256) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector);
    data.extend_from_slice(node.as_slice());
    data
}

/// Decode a single ABI-encoded address word; the zero address means "unset"
pub fn decode_address_word(data: &[u8]) -> Option<Address> {
    if data.len() < 32 {
        return None;
    }
    let address = Address::from_slice(&data[12..32]);
    if address.is_zero() {
        None
    } else {
        Some(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namehash_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            format!("0x{}", hex::encode(namehash("eth"))),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            format!("0x{}", hex::encode(namehash("foo.eth"))),
            "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn test_selectors_match_signatures() {
        assert_eq!(&keccak256("resolver(bytes32)".as_bytes())[..4], &RESOLVER_SELECTOR);
        assert_eq!(&keccak256("addr(bytes32)".as_bytes())[..4], &ADDR_SELECTOR);
    }

    #[test]
    fn test_encode_and_decode() {
        let node = namehash("foo.eth");
        let call = encode_node_call(ADDR_SELECTOR, node);
        assert_eq!(call.len(), 36);
        assert_eq!(&call[..4], &ADDR_SELECTOR);
        assert_eq!(&call[4..], node.as_slice());

        let mut word = [0u8; 32];
        assert_eq!(decode_address_word(&word), None);
        word[12..].copy_from_slice(Address::repeat_byte(0x11).as_slice());
        assert_eq!(decode_address_word(&word), Some(Address::repeat_byte(0x11)));
        assert_eq!(decode_address_word(&word[..20]), None);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Alice.ETH "), "alice.eth");
    }
}
