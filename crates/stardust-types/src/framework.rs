//! Framework constants and well-known addresses for the migration.
//!
//! Compile-time constants for the system packages the migration calls into,
//! so callers never write `AccountAddress::from_hex_literal("0x2").unwrap()`.
//!
//! # Example
//!
//! ```
//! use stardust_migration_types::framework::{IOTA_FRAMEWORK, STARDUST_PACKAGE};
//!
//! assert_eq!(IOTA_FRAMEWORK.to_hex_literal(), "0x2");
//! assert_eq!(STARDUST_PACKAGE.to_hex_literal(), "0x107a");
//! ```

use move_core_types::account_address::AccountAddress;

// ============================================================================
// Framework Package Addresses
// ============================================================================

/// IOTA framework address (0x2)
pub const IOTA_FRAMEWORK: AccountAddress = {
    let mut bytes = [0u8; 32];
    bytes[31] = 2;
    AccountAddress::new(bytes)
};

/// Stardust package holding the migrated output types (0x107a)
pub const STARDUST_PACKAGE: AccountAddress = {
    let mut bytes = [0u8; 32];
    bytes[30] = 0x10;
    bytes[31] = 0x7a;
    AccountAddress::new(bytes)
};

// ============================================================================
// Well-Known Type Strings
// ============================================================================

/// Native currency coin type, the type argument of every output.
pub const IOTA_COIN_TYPE: &str = "0x2::iota::IOTA";

/// Bag implementation holding an output's native tokens.
pub const BAG_TYPE: &str = "0x2::bag::Bag";

/// Module and struct of a migrated basic output.
pub const BASIC_OUTPUT_MODULE: &str = "basic_output";
pub const BASIC_OUTPUT_STRUCT: &str = "BasicOutput";

/// Module and struct of a migrated NFT output.
pub const NFT_OUTPUT_MODULE: &str = "nft_output";
pub const NFT_OUTPUT_STRUCT: &str = "NftOutput";

/// Module exposing `extract_and_send_to`.
pub const UTILITIES_MODULE: &str = "utilities";

/// Full struct type of a basic output holding `coin_type`, as used in
/// owned-object `StructType` filters.
///
/// ```
/// use stardust_migration_types::framework::{basic_output_type, STARDUST_PACKAGE, IOTA_COIN_TYPE};
///
/// assert_eq!(
///     basic_output_type(&STARDUST_PACKAGE, IOTA_COIN_TYPE),
///     "0x107a::basic_output::BasicOutput<0x2::iota::IOTA>"
/// );
/// ```
pub fn basic_output_type(package: &AccountAddress, coin_type: &str) -> String {
    format!(
        "{}::{}::{}<{}>",
        package.to_hex_literal(),
        BASIC_OUTPUT_MODULE,
        BASIC_OUTPUT_STRUCT,
        coin_type
    )
}

/// Full struct type of an NFT output holding `coin_type`.
pub fn nft_output_type(package: &AccountAddress, coin_type: &str) -> String {
    format!(
        "{}::{}::{}<{}>",
        package.to_hex_literal(),
        NFT_OUTPUT_MODULE,
        NFT_OUTPUT_STRUCT,
        coin_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_addresses() {
        assert_eq!(IOTA_FRAMEWORK.to_hex_literal(), "0x2");
        assert_eq!(
            STARDUST_PACKAGE,
            AccountAddress::from_hex_literal("0x107a").unwrap()
        );
    }

    #[test]
    fn test_nft_output_type() {
        assert_eq!(
            nft_output_type(&STARDUST_PACKAGE, IOTA_COIN_TYPE),
            "0x107a::nft_output::NftOutput<0x2::iota::IOTA>"
        );
    }
}
