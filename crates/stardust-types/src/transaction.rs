//! Serialisable programmable transaction.
//!
//! This is the form a finished migration graph is lowered to before it is
//! handed to a signer: an input table plus an ordered command list whose
//! arguments reference inputs or earlier command results by index.

use serde::{Deserialize, Serialize};

/// A programmable transaction: inputs followed by commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<TransactionInput>,
    pub commands: Vec<PtbCommand>,
}

impl ProgrammableTransaction {
    /// Number of Move calls in the transaction.
    pub fn move_call_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PtbCommand::MoveCall { .. }))
            .count()
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A command in a Programmable Transaction Block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PtbCommand {
    /// Move function call
    MoveCall {
        package: String,
        module: String,
        function: String,
        type_arguments: Vec<String>,
        arguments: Vec<PtbArgument>,
    },

    /// Merge coins
    MergeCoins {
        destination: PtbArgument,
        sources: Vec<PtbArgument>,
    },

    /// Transfer objects
    TransferObjects {
        objects: Vec<PtbArgument>,
        address: PtbArgument,
    },
}

impl PtbCommand {
    /// Short label, e.g. `0x107a::basic_output::extract_assets` or `MergeCoins`.
    pub fn label(&self) -> String {
        match self {
            PtbCommand::MoveCall {
                package,
                module,
                function,
                ..
            } => format!("{}::{}::{}", package, module, function),
            PtbCommand::MergeCoins { .. } => "MergeCoins".to_string(),
            PtbCommand::TransferObjects { .. } => "TransferObjects".to_string(),
        }
    }
}

/// Argument reference in a PTB command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PtbArgument {
    /// Reference to a transaction input
    Input { index: u16 },

    /// Reference to a previous command result
    Result { index: u16 },

    /// Reference to a nested result (for multi-return functions)
    NestedResult { index: u16, result_index: u16 },
}

/// Transaction input object or pure value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionInput {
    /// Pure BCS-encoded value
    Pure {
        #[serde(with = "base64_bytes")]
        bytes: Vec<u8>,
    },

    /// Owned object, resolved to a full reference by the signer
    Object { object_id: String },
}

/// Serde helper for base64-encoded byte vectors.
pub mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::encoding::{base64_decode, base64_encode};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&base64_encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        base64_decode(&s, "pure input").map_err(serde::de::Error::custom)
    }
}
