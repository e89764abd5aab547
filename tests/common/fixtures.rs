//! Output payload fixtures.
//!
//! Builds basic and NFT output objects the way `iota_getObject` renders
//! them with `showContent`, so tests go through the real validator.

use move_core_types::account_address::AccountAddress;
use serde_json::{json, Value};

use stardust_migration::types::ObjectData;

pub const BASIC_TYPE: &str = "0x107a::basic_output::BasicOutput<0x2::iota::IOTA>";
pub const NFT_TYPE: &str = "0x107a::nft_output::NftOutput<0x2::iota::IOTA>";

pub fn addr(s: &str) -> AccountAddress {
    AccountAddress::from_hex_literal(s).unwrap()
}

/// A configurable output payload.
#[derive(Debug, Clone)]
pub struct OutputFixture {
    id: String,
    balance: u64,
    bag_id: String,
    bag_size: u64,
    expiration: Option<(String, String, u32)>,
    timelock: Option<u32>,
}

impl OutputFixture {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            balance: 1_000,
            bag_id: format!("{}b", id),
            bag_size: 0,
            expiration: None,
            timelock: None,
        }
    }

    pub fn balance(mut self, balance: u64) -> Self {
        self.balance = balance;
        self
    }

    /// Point at a bag holding `size` token types.
    pub fn bag(mut self, bag_id: &str, size: u64) -> Self {
        self.bag_id = bag_id.to_string();
        self.bag_size = size;
        self
    }

    pub fn expiration(mut self, owner: &str, return_address: &str, unix_time: u32) -> Self {
        self.expiration = Some((owner.to_string(), return_address.to_string(), unix_time));
        self
    }

    pub fn timelock(mut self, unix_time: u32) -> Self {
        self.timelock = Some(unix_time);
        self
    }

    fn fields(&self) -> Value {
        let expiration = self.expiration.as_ref().map(|(owner, ret, t)| {
            json!({
                "type": "0x107a::expiration_unlock_condition::ExpirationUnlockCondition",
                "fields": { "owner": owner, "return_address": ret, "unix_time": t }
            })
        });
        let timelock = self.timelock.map(|t| {
            json!({
                "type": "0x107a::timelock_unlock_condition::TimelockUnlockCondition",
                "fields": { "unix_time": t }
            })
        });
        json!({
            "id": { "id": self.id },
            "balance": self.balance.to_string(),
            "native_tokens": {
                "type": "0x2::bag::Bag",
                "fields": {
                    "id": { "id": self.bag_id },
                    "size": self.bag_size.to_string()
                }
            },
            "expiration_uc": expiration,
            "storage_deposit_return_uc": null,
            "timelock_uc": timelock,
        })
    }

    pub fn basic(&self) -> ObjectData {
        let mut fields = self.fields();
        fields["metadata"] = json!([1, 2, 3]);
        fields["tag"] = Value::Null;
        fields["sender"] = json!("0x5e4d");
        ObjectData::move_object(&self.id, BASIC_TYPE, fields)
            .with_version(7)
            .with_digest("9Xk1cVbR3hUdqs8m4aQy")
    }

    pub fn nft(&self) -> ObjectData {
        ObjectData::move_object(&self.id, NFT_TYPE, self.fields())
            .with_version(7)
            .with_digest("9Xk1cVbR3hUdqs8m4aQy")
    }
}

pub fn basic_output(id: &str) -> ObjectData {
    OutputFixture::new(id).basic()
}

pub fn nft_output(id: &str) -> ObjectData {
    OutputFixture::new(id).nft()
}
