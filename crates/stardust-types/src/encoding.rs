//! Encoding utilities for addresses, hex and base64.
//!
//! Provides shared encoding/decoding functions used across workspace crates.

use anyhow::{anyhow, Result};
use move_core_types::account_address::AccountAddress;

// =============================================================================
// Hex Address Parsing
// =============================================================================

/// Parse a `0x`-prefixed hex string to an AccountAddress with a
/// context-aware error message.
///
/// # Examples
///
/// ```
/// use stardust_migration_types::encoding::parse_address;
///
/// let addr = parse_address("0x107a", "package").unwrap();
/// assert_eq!(addr.to_hex_literal(), "0x107a");
/// assert!(parse_address("107a", "package").is_err());
/// ```
pub fn parse_address(hex_str: &str, context: &str) -> Result<AccountAddress> {
    AccountAddress::from_hex_literal(hex_str.trim())
        .map_err(|e| anyhow!("Invalid {} '{}': {}", context, hex_str, e))
}

// =============================================================================
// Base64 Encoding/Decoding
// =============================================================================

/// Encode bytes to base64 string.
pub fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 string to bytes with context-aware error message.
pub fn base64_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| anyhow!("Failed to decode {} from base64: {}", context, e))
}

// =============================================================================
// Address Formatting
// =============================================================================

/// Format an AccountAddress as a full 66-character hex string (0x + 64 hex chars).
pub fn format_address_full(addr: &AccountAddress) -> String {
    format!("0x{}", hex::encode(addr.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0x2", "test").unwrap();
        assert_eq!(addr, AccountAddress::from_hex_literal("0x2").unwrap());

        let result = parse_address("invalid", "bag id");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid bag id"));
    }

    #[test]
    fn test_parse_address_trims_whitespace() {
        assert!(parse_address("  0x107a ", "package").is_ok());
    }

    #[test]
    fn test_base64_roundtrip() {
        let original = b"stardust";
        let encoded = base64_encode(original);
        let decoded = base64_decode(&encoded, "test").unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_base64_decode_error() {
        let result = base64_decode("not-valid-base64!!!", "pure input");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("pure input"));
    }

    #[test]
    fn test_format_address_full() {
        let addr = AccountAddress::from_hex_literal("0x107a").unwrap();
        let full = format_address_full(&addr);
        assert_eq!(full.len(), 66);
        assert_eq!(
            full,
            "0x000000000000000000000000000000000000000000000000000000000000107a"
        );
    }
}
