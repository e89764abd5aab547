//! Object and dynamic-field payloads as returned by the JSON-RPC API.
//!
//! These types deliberately keep the Move struct fields as untyped
//! [`serde_json::Value`]: decoding them into typed outputs is the validator's
//! job, and a payload that fails validation must still deserialize here so
//! the failure can be reported with the offending field path.
//!
//! ## Design Principles
//!
//! 1. **Content kind is a tag**: `dataType` selects [`ObjectContent::MoveObject`]
//!    or [`ObjectContent::Package`]; an object fetched without content has
//!    `content: None`.
//!
//! 2. **Lenient metadata, strict content**: version/digest/owner are optional
//!    because not every fetch path returns them; Move fields are never
//!    defaulted.

use move_core_types::account_address::AccountAddress;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object ID type (32-byte address).
///
/// This is the canonical ObjectID type for the workspace. Other crates should
/// re-export this rather than defining their own.
pub type ObjectID = AccountAddress;

/// An on-chain object as returned by `iota_getObject` with `showContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    /// Object ID (hex string with 0x prefix).
    pub object_id: String,

    /// Object version, rendered by the node either as a string or a number.
    #[serde(default, with = "string_or_number")]
    pub version: Option<String>,

    /// Object digest (base58).
    #[serde(default)]
    pub digest: Option<String>,

    /// Full Move type of the object, when requested with `showType`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_string: Option<String>,

    /// Owner as rendered by the node, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Value>,

    /// Parsed content; `None` when the object was fetched without content
    /// (for example, BCS only).
    #[serde(default)]
    pub content: Option<ObjectContent>,

    /// Raw BCS rendering, when requested with `showBcs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcs: Option<Value>,
}

impl ObjectData {
    /// Create an object carrying Move object content.
    pub fn move_object(
        object_id: impl Into<String>,
        type_string: impl Into<String>,
        fields: Value,
    ) -> Self {
        let type_string = type_string.into();
        Self {
            object_id: object_id.into(),
            version: None,
            digest: None,
            type_string: Some(type_string.clone()),
            owner: None,
            content: Some(ObjectContent::MoveObject {
                type_string,
                has_public_transfer: false,
                fields,
            }),
            bcs: None,
        }
    }

    /// Builder: set version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Builder: set digest.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Builder: replace the content.
    pub fn with_content(mut self, content: Option<ObjectContent>) -> Self {
        self.content = content;
        self
    }

    /// Parse object ID as AccountAddress.
    ///
    /// Returns None if the object_id is not a valid hex address.
    pub fn object_id_as_address(&self) -> Option<AccountAddress> {
        AccountAddress::from_hex_literal(&self.object_id).ok()
    }
}

/// Parsed object content, tagged by `dataType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "camelCase")]
pub enum ObjectContent {
    /// A Move struct with its fields rendered as JSON.
    MoveObject {
        #[serde(rename = "type")]
        type_string: String,
        #[serde(rename = "hasPublicTransfer", default)]
        has_public_transfer: bool,
        fields: Value,
    },

    /// A published package (module name -> disassembly).
    Package {
        #[serde(default)]
        disassembled: Value,
    },
}

impl ObjectContent {
    /// Short name of the content kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectContent::MoveObject { .. } => "moveObject",
            ObjectContent::Package { .. } => "package",
        }
    }
}

/// Response wrapper of `iota_getObject` and of each owned-object entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectResponse {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Key of a dynamic field: its Move type and JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicFieldName {
    #[serde(rename = "type")]
    pub type_string: String,
    pub value: Value,
}

/// One entry of `iotax_getDynamicFields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldInfo {
    /// Key of the entry. For a native-token bag this is the token type.
    pub name: DynamicFieldName,
    /// BCS-encoded key (base58/base64 depending on node version)
    #[serde(default)]
    pub bcs_name: Option<String>,
    /// `DynamicField` or `DynamicObject`
    #[serde(rename = "type", default)]
    pub field_kind: Option<String>,
    /// Type of the stored value
    #[serde(default)]
    pub object_type: Option<String>,
    /// Object ID of the dynamic field wrapper object
    pub object_id: String,
    #[serde(default, with = "string_or_number")]
    pub version: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
}

impl DynamicFieldInfo {
    /// Entry keyed by a string value, as stored in native-token bags.
    pub fn with_string_key(
        key_type: impl Into<String>,
        key: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Self {
        Self {
            name: DynamicFieldName {
                type_string: key_type.into(),
                value: Value::String(key.into()),
            },
            bcs_name: None,
            field_kind: Some("DynamicField".to_string()),
            object_type: None,
            object_id: object_id.into(),
            version: None,
            digest: None,
        }
    }
}

/// One page of `iotax_getDynamicFields`.
///
/// An absent `next_cursor` or `has_next_page == false` marks the last page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldPage {
    pub data: Vec<DynamicFieldInfo>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

impl DynamicFieldPage {
    /// Whether this is the last page.
    pub fn is_terminal(&self) -> bool {
        !self.has_next_page || self.next_cursor.is_none()
    }
}

/// One page of `iotax_getOwnedObjects`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedObjectsPage {
    pub data: Vec<ObjectResponse>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Accepts a version rendered as `"12"` or `12`.
mod string_or_number {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(serde::de::Error::custom(format!(
                "expected version string or number, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_data_from_rpc_json() {
        let raw = json!({
            "objectId": "0xabc",
            "version": 7,
            "digest": "D1g3st",
            "type": "0x107a::basic_output::BasicOutput<0x2::iota::IOTA>",
            "content": {
                "dataType": "moveObject",
                "type": "0x107a::basic_output::BasicOutput<0x2::iota::IOTA>",
                "hasPublicTransfer": false,
                "fields": { "balance": "10" }
            }
        });
        let obj: ObjectData = serde_json::from_value(raw).unwrap();
        assert_eq!(obj.version.as_deref(), Some("7"));
        assert!(matches!(obj.content, Some(ObjectContent::MoveObject { .. })));
        assert_eq!(
            obj.object_id_as_address(),
            AccountAddress::from_hex_literal("0xabc").ok()
        );
    }

    #[test]
    fn test_package_content_kind() {
        let raw = json!({
            "objectId": "0x2",
            "version": "1",
            "content": { "dataType": "package", "disassembled": {} }
        });
        let obj: ObjectData = serde_json::from_value(raw).unwrap();
        assert_eq!(obj.content.unwrap().kind(), "package");
    }

    #[test]
    fn test_object_without_content() {
        let raw = json!({ "objectId": "0x5", "bcs": { "dataType": "moveObject" } });
        let obj: ObjectData = serde_json::from_value(raw).unwrap();
        assert!(obj.content.is_none());
        assert!(obj.bcs.is_some());
    }

    #[test]
    fn test_dynamic_field_page_terminal() {
        let raw = json!({
            "data": [{
                "name": { "type": "0x1::ascii::String", "value": "0xa::soon::SOON" },
                "type": "DynamicField",
                "objectType": "0x2::balance::Balance<0xa::soon::SOON>",
                "objectId": "0xdf1",
                "version": "3",
                "digest": "x"
            }],
            "nextCursor": "0xdf1",
            "hasNextPage": false
        });
        let page: DynamicFieldPage = serde_json::from_value(raw).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].name.value, json!("0xa::soon::SOON"));
        assert!(page.is_terminal());

        let open = DynamicFieldPage {
            data: vec![],
            next_cursor: Some("c".into()),
            has_next_page: true,
        };
        assert!(!open.is_terminal());
    }
}
