//! Ethereum address parsing and checksum (EIP-55)

use alloy::primitives::Address;

/// Parse a hex address string, accepting the same shapes as a wallet would.
///
/// 40 hex digits with an optional `0x` prefix. All-lowercase and all-uppercase
/// payloads are accepted as-is; mixed-case payloads must carry a valid checksum.
pub fn parse_address(s: &str) -> Option<Address> {
    let payload = strip_hex_prefix(s);
    if payload.len() != 40 || !payload.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let has_lower = payload.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = payload.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(format!("0x{payload}"), None).ok();
    }

    payload.parse().ok()
}

/// Whether the string is a syntactically well-formed address
pub fn is_address(s: &str) -> bool {
    parse_address(s).is_some()
}

/// Looks like an attempt at a hex address rather than a name
pub fn looks_like_hex_address(s: &str) -> bool {
    let trimmed = s.trim();
    (trimmed.starts_with("0x") || trimmed.starts_with("0X")) && !trimmed.contains('.')
}

/// Checksummed `0x` form of an address
pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}

/// Shortened `0x1234..abcd` form for narrow columns
pub fn short_addr(value: &str) -> String {
    let value = value.trim();
    if value.len() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}..{}", start, end)
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}
