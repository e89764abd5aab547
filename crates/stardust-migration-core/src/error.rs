//! Error types for validation, graph construction and batch assembly.

use thiserror::Error;

use crate::output::OutputKind;
use stardust_migration_types::ObjectID;

/// A raw payload that does not match the output schema.
///
/// `path` is the dotted location inside the Move fields, e.g.
/// `native_tokens.fields.size`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected Move object content, found {found}")]
    WrongContentKind { found: String },

    #[error("missing field `{path}`")]
    MissingField { path: String },

    #[error("field `{path}` has the wrong type, expected {expected}")]
    WrongFieldType {
        path: String,
        expected: &'static str,
    },

    #[error("field `{path}` is not a valid {expected}: {value}")]
    InvalidNumber {
        path: String,
        expected: &'static str,
        value: String,
    },

    #[error("field `{path}` is not a valid address: {value}")]
    InvalidAddress { path: String, value: String },

    #[error("native token bag has type {found}, expected {expected}")]
    UnexpectedBagType { expected: String, found: String },

    #[error("content id {content_id} does not match object id {object_id}")]
    IdMismatch {
        object_id: String,
        content_id: String,
    },
}

/// Kind of causality or linearity violation found in a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Reference to a result that doesn't exist yet.
    ForwardReference,
    /// Operation references its own result.
    SelfReference,
    /// Reference to an input index that's out of bounds.
    InputOutOfBounds,
    /// Reference to a result slot the operation does not produce.
    ResultOutOfBounds,
    /// A linear value was used after it was consumed.
    ConsumedTwice,
    /// A linear value is never consumed.
    Unconsumed,
}

/// A specific violation in a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphViolation {
    /// Index of the operation where the violation was found.
    pub operation_index: usize,
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for GraphViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation {}: {}", self.operation_index, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("invalid migration graph: {}", format_violations(.0))]
    Invalid(Vec<GraphViolation>),

    #[error("migration graph exceeds {limit} operations or inputs")]
    TooManyOperations { limit: usize },

    #[error("object {object_id:#x} is used more than once")]
    DuplicateObject { object_id: ObjectID },
}

fn format_violations(violations: &[GraphViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of a whole migration batch. No graph is returned alongside it.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("{kind} {object_id} failed validation")]
    Validation {
        object_id: String,
        kind: OutputKind,
        #[source]
        source: ValidationError,
    },

    #[error("failed to resolve native tokens of bag {bag_id:#x} (output {object_id:#x})")]
    Resolution {
        object_id: ObjectID,
        bag_id: ObjectID,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Construction(#[from] GraphError),

    #[error("nothing to migrate: no basic or NFT outputs given")]
    NothingToMigrate,
}
