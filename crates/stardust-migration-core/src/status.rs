//! Migration status of outputs under their unlock conditions.
//!
//! An output can only be migrated by the address able to unlock it now.
//! The graph builder does not consult this; callers filter a batch with
//! [`group_by_migration_status`] before building.

use move_core_types::account_address::AccountAddress;
use serde::Serialize;

use crate::output::{StardustOutput, UnlockConditions};

/// Why an output cannot be migrated by the given address right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum UnmigratableReason {
    /// The expiration condition currently grants the output to another address.
    ExpirationHeldByOther { unlock_address: AccountAddress },
    /// The output is timelocked until `until` (Unix seconds).
    Timelocked { until: u32 },
}

impl std::fmt::Display for UnmigratableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnmigratableReason::ExpirationHeldByOther { unlock_address } => {
                write!(f, "unlockable only by {}", unlock_address.to_hex_literal())
            }
            UnmigratableReason::Timelocked { until } => write!(f, "timelocked until {}", until),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MigrationStatus {
    Migratable,
    Unmigratable(UnmigratableReason),
}

impl MigrationStatus {
    pub fn is_migratable(&self) -> bool {
        matches!(self, MigrationStatus::Migratable)
    }
}

/// Classify one output's unlock conditions at `epoch_timestamp_ms` for `address`.
///
/// Expiration is checked first: before `unix_time` the owner may unlock,
/// from `unix_time` on the return address. A timelock blocks migration while
/// its `unix_time` lies in the future. Storage deposit returns do not affect
/// the status.
pub fn classify(
    unlock_conditions: &UnlockConditions,
    epoch_timestamp_ms: u64,
    address: &AccountAddress,
) -> MigrationStatus {
    let now_secs = epoch_timestamp_ms / 1000;

    if let Some(expiration) = &unlock_conditions.expiration {
        let unlock_address = expiration.unlock_address(now_secs);
        if unlock_address != *address {
            return MigrationStatus::Unmigratable(UnmigratableReason::ExpirationHeldByOther {
                unlock_address,
            });
        }
    }

    if let Some(timelock) = &unlock_conditions.timelock {
        if timelock.is_locked(now_secs) {
            return MigrationStatus::Unmigratable(UnmigratableReason::Timelocked {
                until: timelock.unix_time,
            });
        }
    }

    MigrationStatus::Migratable
}

/// Outputs split by [`classify`], each side in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedOutputs<T> {
    pub migratable: Vec<T>,
    pub unmigratable: Vec<(T, UnmigratableReason)>,
}

impl<T> Default for GroupedOutputs<T> {
    fn default() -> Self {
        Self {
            migratable: Vec::new(),
            unmigratable: Vec::new(),
        }
    }
}

pub fn group_by_migration_status<T, I>(
    outputs: I,
    epoch_timestamp_ms: u64,
    address: &AccountAddress,
) -> GroupedOutputs<T>
where
    T: StardustOutput,
    I: IntoIterator<Item = T>,
{
    let mut grouped = GroupedOutputs::default();
    for output in outputs {
        match classify(output.unlock_conditions(), epoch_timestamp_ms, address) {
            MigrationStatus::Migratable => grouped.migratable.push(output),
            MigrationStatus::Unmigratable(reason) => grouped.unmigratable.push((output, reason)),
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{
        CommonOutput, ExpirationUnlockCondition, NativeTokenBag, NftOutput,
        StorageDepositReturnUnlockCondition, TimelockUnlockCondition,
    };

    fn addr(s: &str) -> AccountAddress {
        AccountAddress::from_hex_literal(s).unwrap()
    }

    fn expiring(owner: &str, ret: &str, unix_time: u32) -> UnlockConditions {
        UnlockConditions {
            expiration: Some(ExpirationUnlockCondition {
                owner: addr(owner),
                return_address: addr(ret),
                unix_time,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_conditions_is_migratable() {
        let status = classify(&UnlockConditions::default(), 0, &addr("0x1"));
        assert!(status.is_migratable());
    }

    #[test]
    fn test_expiration_before_and_after() {
        let ucs = expiring("0x1", "0x2", 1_000);
        // 999.999s: owner still holds it
        assert!(classify(&ucs, 999_999, &addr("0x1")).is_migratable());
        assert_eq!(
            classify(&ucs, 999_999, &addr("0x2")),
            MigrationStatus::Unmigratable(UnmigratableReason::ExpirationHeldByOther {
                unlock_address: addr("0x1")
            })
        );
        // expired exactly at unix_time: return address takes over
        assert!(classify(&ucs, 1_000_000, &addr("0x2")).is_migratable());
        assert!(!classify(&ucs, 1_000_000, &addr("0x1")).is_migratable());
    }

    #[test]
    fn test_timelock() {
        let ucs = UnlockConditions {
            timelock: Some(TimelockUnlockCondition { unix_time: 60 }),
            storage_deposit_return: Some(StorageDepositReturnUnlockCondition {
                return_address: addr("0x9"),
                return_amount: 1,
            }),
            ..Default::default()
        };
        assert_eq!(
            classify(&ucs, 59_000, &addr("0x1")),
            MigrationStatus::Unmigratable(UnmigratableReason::Timelocked { until: 60 })
        );
        assert!(classify(&ucs, 60_000, &addr("0x1")).is_migratable());
    }

    #[test]
    fn test_group_preserves_order() {
        let output = |id: &str, ucs: UnlockConditions| NftOutput {
            common: CommonOutput {
                id: addr(id),
                balance: 1,
                native_tokens: NativeTokenBag {
                    id: addr("0xb"),
                    size: 0,
                },
                unlock_conditions: ucs,
            },
        };
        let outputs = vec![
            output("0x10", UnlockConditions::default()),
            output("0x11", expiring("0x5", "0x6", 10)),
            output("0x12", UnlockConditions::default()),
        ];
        let grouped = group_by_migration_status(outputs, 0, &addr("0x1"));
        let ids: Vec<_> = grouped.migratable.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![addr("0x10"), addr("0x12")]);
        assert_eq!(grouped.unmigratable.len(), 1);
        assert_eq!(grouped.unmigratable[0].0.id(), addr("0x11"));
    }
}
