//! Output schema validation.
//!
//! Turns a raw [`ObjectData`] into a typed [`BasicOutput`] or [`NftOutput`],
//! or rejects it. The payload is never partially decoded: either every field
//! conforms or the first nonconforming field is reported with its path.
//!
//! Encoding accepted for the Move fields:
//!
//! | Move type | JSON |
//! |---|---|
//! | `u64` | decimal digit string (`"1000"`) |
//! | `u32` | number |
//! | `address` / `UID` | `0x`-prefixed hex string / `{ "id": "0x.." }` |
//! | `vector<u8>` | array of numbers in `0..=255` |
//! | `Option<T>` | `null` or absent for none |
//! | struct | `{ "type": "..", "fields": { .. } }` |

use move_core_types::account_address::AccountAddress;
use serde_json::{Map, Value};

use stardust_migration_types::framework::BAG_TYPE;
use stardust_migration_types::{ObjectContent, ObjectData};

use crate::config::MigrationConfig;
use crate::error::ValidationError;
use crate::output::{
    BasicOutput, CommonOutput, ExpirationUnlockCondition, NativeTokenBag, NftOutput,
    StorageDepositReturnUnlockCondition, TimelockUnlockCondition, UnlockConditions,
};

type Result<T> = std::result::Result<T, ValidationError>;

/// Validate a basic output payload against the default bag type.
pub fn validate_basic_output(object: &ObjectData) -> Result<BasicOutput> {
    OutputValidator::default().validate_basic(object)
}

/// Validate an NFT output payload against the default bag type.
pub fn validate_nft_output(object: &ObjectData) -> Result<NftOutput> {
    OutputValidator::default().validate_nft(object)
}

/// Schema validator parameterised by the expected bag type.
#[derive(Debug, Clone)]
pub struct OutputValidator {
    bag_type: String,
}

impl Default for OutputValidator {
    fn default() -> Self {
        Self {
            bag_type: BAG_TYPE.to_string(),
        }
    }
}

impl OutputValidator {
    pub fn new(config: &MigrationConfig) -> Self {
        Self {
            bag_type: config.bag_type.clone(),
        }
    }

    pub fn validate_basic(&self, object: &ObjectData) -> Result<BasicOutput> {
        let fields = move_fields(object)?;
        let common = self.common(object, &fields)?;

        let metadata = fields.optional("metadata").map(|v| fields.bytes("metadata", v));
        let tag = fields.optional("tag").map(|v| fields.bytes("tag", v));
        let sender = fields
            .optional("sender")
            .map(|v| fields.address("sender", v));

        Ok(BasicOutput {
            common,
            metadata: metadata.transpose()?,
            tag: tag.transpose()?,
            sender: sender.transpose()?,
        })
    }

    pub fn validate_nft(&self, object: &ObjectData) -> Result<NftOutput> {
        let fields = move_fields(object)?;
        let common = self.common(object, &fields)?;
        Ok(NftOutput { common })
    }

    fn common(&self, object: &ObjectData, fields: &Fields<'_>) -> Result<CommonOutput> {
        let id = fields.object("id")?.uid_inner()?;
        let object_id = AccountAddress::from_hex_literal(object.object_id.trim()).map_err(|_| {
            ValidationError::InvalidAddress {
                path: "objectId".to_string(),
                value: object.object_id.clone(),
            }
        })?;
        if id != object_id {
            return Err(ValidationError::IdMismatch {
                object_id: object.object_id.clone(),
                content_id: id.to_hex_literal(),
            });
        }

        let balance = fields.u64_string("balance", fields.required("balance")?)?;

        let native_tokens = fields.object("native_tokens")?;
        let bag_type = native_tokens.string("type", native_tokens.required("type")?)?;
        if bag_type != self.bag_type {
            return Err(ValidationError::UnexpectedBagType {
                expected: self.bag_type.clone(),
                found: bag_type.to_string(),
            });
        }
        let bag_fields = native_tokens.object("fields")?;
        let bag = NativeTokenBag {
            id: bag_fields.object("id")?.uid_inner()?,
            size: bag_fields.u64_string("size", bag_fields.required("size")?)?,
        };

        Ok(CommonOutput {
            id,
            balance,
            native_tokens: bag,
            unlock_conditions: unlock_conditions(fields)?,
        })
    }
}

fn unlock_conditions(fields: &Fields<'_>) -> Result<UnlockConditions> {
    let expiration = match fields.optional_struct_fields("expiration_uc")? {
        Some(uc) => Some(ExpirationUnlockCondition {
            owner: uc.address("owner", uc.required("owner")?)?,
            return_address: uc.address("return_address", uc.required("return_address")?)?,
            unix_time: uc.u32_number("unix_time", uc.required("unix_time")?)?,
        }),
        None => None,
    };

    let storage_deposit_return = match fields.optional_struct_fields("storage_deposit_return_uc")? {
        Some(uc) => Some(StorageDepositReturnUnlockCondition {
            return_address: uc.address("return_address", uc.required("return_address")?)?,
            return_amount: uc.u64_string("return_amount", uc.required("return_amount")?)?,
        }),
        None => None,
    };

    let timelock = match fields.optional_struct_fields("timelock_uc")? {
        Some(uc) => Some(TimelockUnlockCondition {
            unix_time: uc.u32_number("unix_time", uc.required("unix_time")?)?,
        }),
        None => None,
    };

    Ok(UnlockConditions {
        expiration,
        storage_deposit_return,
        timelock,
    })
}

/// The Move fields of a Move-object payload.
fn move_fields(object: &ObjectData) -> Result<Fields<'_>> {
    match &object.content {
        Some(ObjectContent::MoveObject { fields, .. }) => match fields {
            Value::Object(map) => Ok(Fields {
                map,
                prefix: String::new(),
            }),
            _ => Err(ValidationError::WrongFieldType {
                path: "content.fields".to_string(),
                expected: "object",
            }),
        },
        Some(other) => Err(ValidationError::WrongContentKind {
            found: other.kind().to_string(),
        }),
        None if object.bcs.is_some() => Err(ValidationError::WrongContentKind {
            found: "bcs".to_string(),
        }),
        None => Err(ValidationError::WrongContentKind {
            found: "no content".to_string(),
        }),
    }
}

/// A JSON object being walked, with the dotted path that led to it.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    prefix: String,
}

impl<'a> Fields<'a> {
    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    /// Present and non-null.
    fn required(&self, key: &str) -> Result<&'a Value> {
        match self.map.get(key) {
            None | Some(Value::Null) => Err(ValidationError::MissingField {
                path: self.path(key),
            }),
            Some(v) => Ok(v),
        }
    }

    /// `None` for null or absent.
    fn optional(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn object(&self, key: &str) -> Result<Fields<'a>> {
        let value = self.required(key)?;
        self.nested(key, value)
    }

    fn nested(&self, key: &str, value: &'a Value) -> Result<Fields<'a>> {
        match value {
            Value::Object(map) => Ok(Fields {
                map,
                prefix: self.path(key),
            }),
            _ => Err(ValidationError::WrongFieldType {
                path: self.path(key),
                expected: "object",
            }),
        }
    }

    /// Fields of an optional Move struct rendered as `{ type, fields }`.
    fn optional_struct_fields(&self, key: &str) -> Result<Option<Fields<'a>>> {
        match self.optional(key) {
            None => Ok(None),
            Some(value) => self.nested(key, value)?.object("fields").map(Some),
        }
    }

    /// The address inside a `UID`, i.e. `{ "id": "0x.." }` walked to `id`.
    fn uid_inner(&self) -> Result<AccountAddress> {
        self.address("id", self.required("id")?)
    }

    fn string(&self, key: &str, value: &'a Value) -> Result<&'a str> {
        value.as_str().ok_or_else(|| ValidationError::WrongFieldType {
            path: self.path(key),
            expected: "string",
        })
    }

    fn address(&self, key: &str, value: &Value) -> Result<AccountAddress> {
        let raw = value.as_str().ok_or_else(|| ValidationError::WrongFieldType {
            path: self.path(key),
            expected: "address string",
        })?;
        if !raw.starts_with("0x") {
            return Err(ValidationError::InvalidAddress {
                path: self.path(key),
                value: raw.to_string(),
            });
        }
        AccountAddress::from_hex_literal(raw).map_err(|_| ValidationError::InvalidAddress {
            path: self.path(key),
            value: raw.to_string(),
        })
    }

    fn u64_string(&self, key: &str, value: &Value) -> Result<u64> {
        let raw = value.as_str().ok_or_else(|| ValidationError::WrongFieldType {
            path: self.path(key),
            expected: "decimal string",
        })?;
        let invalid = || ValidationError::InvalidNumber {
            path: self.path(key),
            expected: "u64",
            value: raw.to_string(),
        };
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        raw.parse::<u64>().map_err(|_| invalid())
    }

    fn u32_number(&self, key: &str, value: &Value) -> Result<u32> {
        let n = match value {
            Value::Number(n) => n,
            _ => {
                return Err(ValidationError::WrongFieldType {
                    path: self.path(key),
                    expected: "number",
                })
            }
        };
        n.as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ValidationError::InvalidNumber {
                path: self.path(key),
                expected: "u32",
                value: n.to_string(),
            })
    }

    fn bytes(&self, key: &str, value: &Value) -> Result<Vec<u8>> {
        let items = value
            .as_array()
            .ok_or_else(|| ValidationError::WrongFieldType {
                path: self.path(key),
                expected: "byte array",
            })?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| ValidationError::InvalidNumber {
                        path: format!("{}[{}]", self.path(key), i),
                        expected: "u8",
                        value: item.to_string(),
                    })
            })
            .collect()
    }
}
