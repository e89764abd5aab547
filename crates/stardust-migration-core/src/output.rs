//! Typed Stardust output records.
//!
//! Produced only by the validator; every field here has been checked against
//! the raw payload, so downstream code never re-inspects JSON.

use move_core_types::account_address::AccountAddress;
use serde::Serialize;

use stardust_migration_types::framework::{BASIC_OUTPUT_MODULE, NFT_OUTPUT_MODULE};
use stardust_migration_types::ObjectID;

/// Which Stardust output type an object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Basic,
    Nft,
}

impl OutputKind {
    /// Move module declaring the output and its `extract_assets`.
    pub fn module(&self) -> &'static str {
        match self {
            OutputKind::Basic => BASIC_OUTPUT_MODULE,
            OutputKind::Nft => NFT_OUTPUT_MODULE,
        }
    }

    /// Number of values `extract_assets` returns.
    pub fn extracted_values(&self) -> u16 {
        match self {
            OutputKind::Basic => 2,
            OutputKind::Nft => 3,
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Basic => write!(f, "basic output"),
            OutputKind::Nft => write!(f, "NFT output"),
        }
    }
}

/// Handle to the bag of native tokens carried by an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeTokenBag {
    pub id: ObjectID,
    /// Number of distinct token types in the bag. Zero means the bag is
    /// known empty and is never enumerated.
    pub size: u64,
}

impl NativeTokenBag {
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpirationUnlockCondition {
    pub owner: AccountAddress,
    pub return_address: AccountAddress,
    /// Seconds since the Unix epoch.
    pub unix_time: u32,
}

impl ExpirationUnlockCondition {
    /// Address able to unlock the output at `now_secs`: the return address
    /// once expired, the owner before.
    pub fn unlock_address(&self, now_secs: u64) -> AccountAddress {
        if u64::from(self.unix_time) <= now_secs {
            self.return_address
        } else {
            self.owner
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageDepositReturnUnlockCondition {
    pub return_address: AccountAddress,
    pub return_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelockUnlockCondition {
    /// Seconds since the Unix epoch.
    pub unix_time: u32,
}

impl TimelockUnlockCondition {
    pub fn is_locked(&self, now_secs: u64) -> bool {
        u64::from(self.unix_time) > now_secs
    }
}

/// One unlock condition, independent of which slot it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UnlockCondition {
    Expiration(ExpirationUnlockCondition),
    StorageDepositReturn(StorageDepositReturnUnlockCondition),
    Timelock(TimelockUnlockCondition),
}

/// The three optional unlock condition slots of an output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnlockConditions {
    pub expiration: Option<ExpirationUnlockCondition>,
    pub storage_deposit_return: Option<StorageDepositReturnUnlockCondition>,
    pub timelock: Option<TimelockUnlockCondition>,
}

impl UnlockConditions {
    pub fn is_empty(&self) -> bool {
        self.expiration.is_none()
            && self.storage_deposit_return.is_none()
            && self.timelock.is_none()
    }

    /// Present conditions in slot order.
    pub fn iter(&self) -> impl Iterator<Item = UnlockCondition> {
        [
            self.expiration.map(UnlockCondition::Expiration),
            self.storage_deposit_return
                .map(UnlockCondition::StorageDepositReturn),
            self.timelock.map(UnlockCondition::Timelock),
        ]
        .into_iter()
        .flatten()
    }
}

/// Fields shared by basic and NFT outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonOutput {
    pub id: ObjectID,
    pub balance: u64,
    pub native_tokens: NativeTokenBag,
    pub unlock_conditions: UnlockConditions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicOutput {
    #[serde(flatten)]
    pub common: CommonOutput,
    pub metadata: Option<Vec<u8>>,
    pub tag: Option<Vec<u8>>,
    pub sender: Option<AccountAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftOutput {
    #[serde(flatten)]
    pub common: CommonOutput,
}

/// Access to the common part of either output type.
pub trait StardustOutput {
    const KIND: OutputKind;

    fn common(&self) -> &CommonOutput;

    fn id(&self) -> ObjectID {
        self.common().id
    }

    fn native_tokens(&self) -> &NativeTokenBag {
        &self.common().native_tokens
    }

    fn unlock_conditions(&self) -> &UnlockConditions {
        &self.common().unlock_conditions
    }
}

impl StardustOutput for BasicOutput {
    const KIND: OutputKind = OutputKind::Basic;

    fn common(&self) -> &CommonOutput {
        &self.common
    }
}

impl StardustOutput for NftOutput {
    const KIND: OutputKind = OutputKind::Nft;

    fn common(&self) -> &CommonOutput {
        &self.common
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> AccountAddress {
        AccountAddress::from_hex_literal(s).unwrap()
    }

    #[test]
    fn test_expiration_unlock_address() {
        let uc = ExpirationUnlockCondition {
            owner: addr("0x1"),
            return_address: addr("0x2"),
            unix_time: 1_000,
        };
        assert_eq!(uc.unlock_address(999), addr("0x1"));
        assert_eq!(uc.unlock_address(1_000), addr("0x2"));
    }

    #[test]
    fn test_timelock() {
        let uc = TimelockUnlockCondition { unix_time: 50 };
        assert!(uc.is_locked(49));
        assert!(!uc.is_locked(50));
    }

    #[test]
    fn test_unlock_conditions_iter() {
        let mut ucs = UnlockConditions::default();
        assert!(ucs.is_empty());
        assert_eq!(ucs.iter().count(), 0);

        ucs.timelock = Some(TimelockUnlockCondition { unix_time: 1 });
        ucs.storage_deposit_return = Some(StorageDepositReturnUnlockCondition {
            return_address: addr("0x3"),
            return_amount: 10,
        });
        let kinds: Vec<_> = ucs.iter().collect();
        assert_eq!(kinds.len(), 2);
        assert!(matches!(kinds[0], UnlockCondition::StorageDepositReturn(_)));
        assert!(matches!(kinds[1], UnlockCondition::Timelock(_)));
    }

    #[test]
    fn test_output_kind() {
        assert_eq!(OutputKind::Basic.module(), "basic_output");
        assert_eq!(OutputKind::Nft.extracted_values(), 3);
        assert_eq!(NftOutput::KIND, OutputKind::Nft);
    }
}
