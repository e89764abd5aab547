//! Append-only migration transaction graph.
//!
//! [`GraphBuilder`] records operations in order and hands back typed handles
//! to their results. Handles for linear values ([`BalanceHandle`],
//! [`BagHandle`], [`CoinHandle`], [`NftHandle`], [`OutputHandle`]) are neither
//! `Clone` nor `Copy`, and every consuming operation takes them by value, so
//! a value cannot be consumed twice or after it was replaced by a newer one.
//!
//! The finished [`MigrationGraph`] is checked once more at runtime by
//! [`MigrationGraph::validate`] (causality and linear use), then lowered to a
//! serialisable [`ProgrammableTransaction`] for signing.
//!
//! ## Operation results
//!
//! | Operation | Results |
//! |---|---|
//! | `ExtractAssets` (basic) | `NestedResult(k,0)` balance, `NestedResult(k,1)` bag |
//! | `ExtractAssets` (NFT) | as basic, plus `NestedResult(k,2)` NFT |
//! | `BalanceToCoin` | `Result(k)` coin |
//! | `ExtractAndSend` | `Result(k)` remaining bag |
//! | `DestroyEmptyBag`, `MergeCoins`, `TransferObjects` | none |

use std::collections::HashSet;
use std::fmt;

use move_core_types::account_address::AccountAddress;
use serde::Serialize;

use stardust_migration_types::encoding::format_address_full;
use stardust_migration_types::framework::{IOTA_FRAMEWORK, UTILITIES_MODULE};
use stardust_migration_types::{
    ObjectID, ProgrammableTransaction, PtbArgument, PtbCommand, TransactionInput,
};

use crate::config::MigrationConfig;
use crate::error::{GraphError, GraphViolation, ViolationKind};
use crate::output::OutputKind;

/// Operations or inputs a single transaction can address.
pub const MAX_ENTRIES: usize = u16::MAX as usize;

/// Reference to a value in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Argument {
    /// Reference to a graph input (by index)
    Input(u16),
    /// The single result of an operation (by operation index)
    Result(u16),
    /// One value of a multi-result operation (operation index, value index)
    NestedResult(u16, u16),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Input(i) => write!(f, "Input({})", i),
            Argument::Result(k) => write!(f, "Result({})", k),
            Argument::NestedResult(k, n) => write!(f, "NestedResult({}, {})", k, n),
        }
    }
}

impl From<Argument> for PtbArgument {
    fn from(arg: Argument) -> Self {
        match arg {
            Argument::Input(index) => PtbArgument::Input { index },
            Argument::Result(index) => PtbArgument::Result { index },
            Argument::NestedResult(index, result_index) => PtbArgument::NestedResult {
                index,
                result_index,
            },
        }
    }
}

/// A graph input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GraphInput {
    /// Pure address value; may be read any number of times.
    Address(AccountAddress),
    /// Owned output object; consumed exactly once.
    Object(ObjectID),
}

/// One step of the migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operation {
    /// `{package}::{basic_output|nft_output}::extract_assets<coin>(output)`
    ExtractAssets { kind: OutputKind, output: Argument },
    /// `0x2::coin::from_balance<coin>(balance)`
    BalanceToCoin { balance: Argument },
    /// `{package}::utilities::extract_and_send_to<token_type>(bag, recipient)`
    ExtractAndSend {
        token_type: String,
        bag: Argument,
        recipient: Argument,
    },
    /// `0x2::bag::destroy_empty(bag)`
    DestroyEmptyBag { bag: Argument },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    TransferObjects {
        objects: Vec<Argument>,
        recipient: Argument,
    },
}

/// How an operation uses one of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    /// Takes ownership; the value is gone afterwards.
    Consume,
    /// Mutable borrow; the value stays available.
    Borrow,
    /// Copyable read (pure inputs).
    Read,
}

impl Operation {
    /// Number of values the operation returns.
    pub fn result_count(&self) -> u16 {
        match self {
            Operation::ExtractAssets { kind, .. } => kind.extracted_values(),
            Operation::BalanceToCoin { .. } | Operation::ExtractAndSend { .. } => 1,
            Operation::DestroyEmptyBag { .. }
            | Operation::MergeCoins { .. }
            | Operation::TransferObjects { .. } => 0,
        }
    }

    /// Arguments with their usage. Merge sources come before the
    /// destination so a coin merged into itself shows up as a reuse.
    fn uses(&self) -> Vec<(Argument, Usage)> {
        match self {
            Operation::ExtractAssets { output, .. } => vec![(*output, Usage::Consume)],
            Operation::BalanceToCoin { balance } => vec![(*balance, Usage::Consume)],
            Operation::ExtractAndSend { bag, recipient, .. } => {
                vec![(*bag, Usage::Consume), (*recipient, Usage::Read)]
            }
            Operation::DestroyEmptyBag { bag } => vec![(*bag, Usage::Consume)],
            Operation::MergeCoins {
                destination,
                sources,
            } => {
                let mut uses: Vec<_> = sources.iter().map(|s| (*s, Usage::Consume)).collect();
                uses.push((*destination, Usage::Borrow));
                uses
            }
            Operation::TransferObjects { objects, recipient } => {
                let mut uses: Vec<_> = objects.iter().map(|o| (*o, Usage::Consume)).collect();
                uses.push((*recipient, Usage::Read));
                uses
            }
        }
    }

    /// Short name for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::ExtractAssets { .. } => "extract_assets",
            Operation::BalanceToCoin { .. } => "balance_to_coin",
            Operation::ExtractAndSend { .. } => "extract_and_send",
            Operation::DestroyEmptyBag { .. } => "destroy_empty_bag",
            Operation::MergeCoins { .. } => "merge_coins",
            Operation::TransferObjects { .. } => "transfer_objects",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ExtractAssets { kind, output } => {
                write!(f, "{}::extract_assets({})", kind.module(), output)
            }
            Operation::BalanceToCoin { balance } => write!(f, "coin::from_balance({})", balance),
            Operation::ExtractAndSend {
                token_type,
                bag,
                recipient,
            } => write!(
                f,
                "utilities::extract_and_send_to<{}>({}, {})",
                token_type, bag, recipient
            ),
            Operation::DestroyEmptyBag { bag } => write!(f, "bag::destroy_empty({})", bag),
            Operation::MergeCoins {
                destination,
                sources,
            } => write!(f, "MergeCoins({}, [{}])", destination, join(sources)),
            Operation::TransferObjects { objects, recipient } => {
                write!(f, "TransferObjects([{}], {})", join(objects), recipient)
            }
        }
    }
}

fn join(args: &[Argument]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Handles
// =============================================================================

macro_rules! linear_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, PartialEq, Eq)]
        #[must_use]
        pub struct $name(Argument);

        impl $name {
            /// The argument this handle refers to.
            pub fn argument(&self) -> Argument {
                self.0
            }
        }
    };
}

linear_handle!(
    /// An output object input, consumed by `extract_assets`.
    OutputHandle
);
linear_handle!(
    /// A `Balance<coin>` extracted from an output.
    BalanceHandle
);
linear_handle!(
    /// The current native-token bag of one output.
    BagHandle
);
linear_handle!(
    /// A `Coin<coin>` converted from a balance.
    CoinHandle
);
linear_handle!(
    /// An NFT extracted from an NFT output.
    NftHandle
);

/// A pure address input; reading it does not consume it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressHandle(Argument);

impl AddressHandle {
    pub fn argument(&self) -> Argument {
        self.0
    }
}

/// Something `TransferObjects` can move.
#[derive(Debug)]
pub enum Transferable {
    Coin(CoinHandle),
    Nft(NftHandle),
}

impl Transferable {
    fn argument(&self) -> Argument {
        match self {
            Transferable::Coin(c) => c.0,
            Transferable::Nft(n) => n.0,
        }
    }
}

impl From<CoinHandle> for Transferable {
    fn from(coin: CoinHandle) -> Self {
        Transferable::Coin(coin)
    }
}

impl From<NftHandle> for Transferable {
    fn from(nft: NftHandle) -> Self {
        Transferable::Nft(nft)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Append-only log of operations.
#[derive(Debug)]
pub struct GraphBuilder {
    inputs: Vec<GraphInput>,
    operations: Vec<Operation>,
    stardust_package: AccountAddress,
    coin_type: String,
}

impl GraphBuilder {
    pub fn new(config: &MigrationConfig) -> Self {
        Self {
            inputs: Vec::new(),
            operations: Vec::new(),
            stardust_package: config.stardust_package,
            coin_type: config.coin_type.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn push_input(&mut self, input: GraphInput) -> Result<u16, GraphError> {
        let idx = self.inputs.len();
        if idx >= MAX_ENTRIES {
            return Err(GraphError::TooManyOperations { limit: MAX_ENTRIES });
        }
        self.inputs.push(input);
        Ok(idx as u16)
    }

    fn push(&mut self, op: Operation) -> Result<u16, GraphError> {
        let idx = self.operations.len();
        if idx >= MAX_ENTRIES {
            return Err(GraphError::TooManyOperations { limit: MAX_ENTRIES });
        }
        self.operations.push(op);
        Ok(idx as u16)
    }

    /// Add an address input, reusing an existing input for the same address.
    pub fn address(&mut self, address: AccountAddress) -> Result<AddressHandle, GraphError> {
        let existing = self
            .inputs
            .iter()
            .position(|i| matches!(i, GraphInput::Address(a) if *a == address));
        let idx = match existing {
            Some(idx) => idx as u16,
            None => self.push_input(GraphInput::Address(address))?,
        };
        Ok(AddressHandle(Argument::Input(idx)))
    }

    /// Add an owned output object input. Each object may be added once.
    pub fn output_object(&mut self, id: ObjectID) -> Result<OutputHandle, GraphError> {
        if self
            .inputs
            .iter()
            .any(|i| matches!(i, GraphInput::Object(o) if *o == id))
        {
            return Err(GraphError::DuplicateObject { object_id: id });
        }
        let idx = self.push_input(GraphInput::Object(id))?;
        Ok(OutputHandle(Argument::Input(idx)))
    }

    pub fn extract_basic_assets(
        &mut self,
        output: OutputHandle,
    ) -> Result<(BalanceHandle, BagHandle), GraphError> {
        let k = self.push(Operation::ExtractAssets {
            kind: OutputKind::Basic,
            output: output.0,
        })?;
        Ok((
            BalanceHandle(Argument::NestedResult(k, 0)),
            BagHandle(Argument::NestedResult(k, 1)),
        ))
    }

    pub fn extract_nft_assets(
        &mut self,
        output: OutputHandle,
    ) -> Result<(BalanceHandle, BagHandle, NftHandle), GraphError> {
        let k = self.push(Operation::ExtractAssets {
            kind: OutputKind::Nft,
            output: output.0,
        })?;
        Ok((
            BalanceHandle(Argument::NestedResult(k, 0)),
            BagHandle(Argument::NestedResult(k, 1)),
            NftHandle(Argument::NestedResult(k, 2)),
        ))
    }

    pub fn balance_to_coin(&mut self, balance: BalanceHandle) -> Result<CoinHandle, GraphError> {
        let k = self.push(Operation::BalanceToCoin { balance: balance.0 })?;
        Ok(CoinHandle(Argument::Result(k)))
    }

    /// Send every token of `token_type` in the bag to `recipient`; returns
    /// the bag without that entry.
    pub fn extract_and_send(
        &mut self,
        token_type: &str,
        bag: BagHandle,
        recipient: AddressHandle,
    ) -> Result<BagHandle, GraphError> {
        let k = self.push(Operation::ExtractAndSend {
            token_type: token_type.to_string(),
            bag: bag.0,
            recipient: recipient.0,
        })?;
        Ok(BagHandle(Argument::Result(k)))
    }

    pub fn destroy_empty_bag(&mut self, bag: BagHandle) -> Result<(), GraphError> {
        self.push(Operation::DestroyEmptyBag { bag: bag.0 })?;
        Ok(())
    }

    /// Merge `sources` into `destination`, which stays usable.
    pub fn merge_coins(
        &mut self,
        destination: &CoinHandle,
        sources: Vec<CoinHandle>,
    ) -> Result<(), GraphError> {
        self.push(Operation::MergeCoins {
            destination: destination.0,
            sources: sources.into_iter().map(|c| c.0).collect(),
        })?;
        Ok(())
    }

    pub fn transfer_objects(
        &mut self,
        objects: Vec<Transferable>,
        recipient: AddressHandle,
    ) -> Result<(), GraphError> {
        self.push(Operation::TransferObjects {
            objects: objects.iter().map(Transferable::argument).collect(),
            recipient: recipient.0,
        })?;
        Ok(())
    }

    /// Freeze the log into a validated graph.
    pub fn finish(self) -> Result<MigrationGraph, GraphError> {
        let graph = MigrationGraph {
            inputs: self.inputs,
            operations: self.operations,
            stardust_package: self.stardust_package,
            coin_type: self.coin_type,
        };
        graph.validate()?;
        Ok(graph)
    }
}

// =============================================================================
// Finished graph
// =============================================================================

/// A complete, validated migration graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationGraph {
    inputs: Vec<GraphInput>,
    operations: Vec<Operation>,
    stardust_package: AccountAddress,
    coin_type: String,
}

/// A value slot tracked for linear use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Input(u16),
    Result(u16, u16),
}

impl MigrationGraph {
    pub fn inputs(&self) -> &[GraphInput] {
        &self.inputs
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations with the given label.
    pub fn count(&self, label: &str) -> usize {
        self.operations.iter().filter(|op| op.label() == label).count()
    }

    /// Check causality and linear use.
    ///
    /// - every result reference points to an earlier operation and to a
    ///   value slot that operation produces
    /// - every input reference is in range
    /// - every output object and every produced value is consumed exactly
    ///   once, and nothing is borrowed after being consumed
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.operations.len() > MAX_ENTRIES || self.inputs.len() > MAX_ENTRIES {
            return Err(GraphError::TooManyOperations { limit: MAX_ENTRIES });
        }

        let mut violations = Vec::new();
        let mut consumed: HashSet<Slot> = HashSet::new();

        for (idx, op) in self.operations.iter().enumerate() {
            for (arg, usage) in op.uses() {
                let slot = match self.resolve(idx, arg) {
                    Ok(slot) => slot,
                    Err((kind, message)) => {
                        violations.push(GraphViolation {
                            operation_index: idx,
                            kind,
                            message,
                        });
                        continue;
                    }
                };

                if !self.is_linear(slot) {
                    continue;
                }
                if consumed.contains(&slot) {
                    violations.push(GraphViolation {
                        operation_index: idx,
                        kind: ViolationKind::ConsumedTwice,
                        message: format!("{} is used after it was consumed", arg),
                    });
                    continue;
                }
                if usage == Usage::Consume {
                    consumed.insert(slot);
                }
            }
        }

        for slot in self.linear_slots() {
            if !consumed.contains(&slot) {
                let (operation_index, message) = match slot {
                    Slot::Input(i) => (0, format!("input {} is never consumed", i)),
                    Slot::Result(k, n) => (
                        k as usize,
                        format!("result {} of operation {} is never consumed", n, k),
                    ),
                };
                violations.push(GraphViolation {
                    operation_index,
                    kind: ViolationKind::Unconsumed,
                    message,
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(GraphError::Invalid(violations))
        }
    }

    /// Map an argument of operation `idx` to the slot it names.
    fn resolve(&self, idx: usize, arg: Argument) -> Result<Slot, (ViolationKind, String)> {
        let (producer, value) = match arg {
            Argument::Input(i) => {
                return if (i as usize) < self.inputs.len() {
                    Ok(Slot::Input(i))
                } else {
                    Err((
                        ViolationKind::InputOutOfBounds,
                        format!("{} but only {} inputs available", arg, self.inputs.len()),
                    ))
                };
            }
            Argument::Result(k) => (k, None),
            Argument::NestedResult(k, n) => (k, Some(n)),
        };

        let producer_idx = producer as usize;
        if producer_idx == idx {
            return Err((
                ViolationKind::SelfReference,
                format!("{} references its own result", arg),
            ));
        }
        if producer_idx > idx {
            return Err((
                ViolationKind::ForwardReference,
                format!("{} has not been produced yet", arg),
            ));
        }

        let produced = self.operations[producer_idx].result_count();
        match value {
            None if produced == 1 => Ok(Slot::Result(producer, 0)),
            Some(n) if n < produced => Ok(Slot::Result(producer, n)),
            _ => Err((
                ViolationKind::ResultOutOfBounds,
                format!(
                    "{} but operation {} produces {} value(s)",
                    arg, producer, produced
                ),
            )),
        }
    }

    fn is_linear(&self, slot: Slot) -> bool {
        match slot {
            Slot::Input(i) => matches!(self.inputs.get(i as usize), Some(GraphInput::Object(_))),
            Slot::Result(..) => true,
        }
    }

    fn linear_slots(&self) -> Vec<Slot> {
        let inputs = self
            .inputs
            .iter()
            .enumerate()
            .filter(|(_, input)| matches!(input, GraphInput::Object(_)))
            .map(|(i, _)| Slot::Input(i as u16));
        let results = self.operations.iter().enumerate().flat_map(|(k, op)| {
            (0..op.result_count()).map(move |n| Slot::Result(k as u16, n))
        });
        inputs.chain(results).collect()
    }

    /// Lower to the serialisable transaction form.
    pub fn to_programmable_transaction(&self) -> ProgrammableTransaction {
        let inputs = self
            .inputs
            .iter()
            .map(|input| match input {
                GraphInput::Address(address) => TransactionInput::Pure {
                    bytes: address.to_vec(),
                },
                GraphInput::Object(id) => TransactionInput::Object {
                    object_id: format_address_full(id),
                },
            })
            .collect();

        let commands = self.operations.iter().map(|op| self.lower(op)).collect();

        ProgrammableTransaction { inputs, commands }
    }

    fn lower(&self, op: &Operation) -> PtbCommand {
        let package = self.stardust_package.to_hex_literal();
        let framework = IOTA_FRAMEWORK.to_hex_literal();
        match op {
            Operation::ExtractAssets { kind, output } => move_call(
                package,
                kind.module(),
                "extract_assets",
                vec![self.coin_type.clone()],
                &[*output],
            ),
            Operation::BalanceToCoin { balance } => move_call(
                framework,
                "coin",
                "from_balance",
                vec![self.coin_type.clone()],
                &[*balance],
            ),
            Operation::ExtractAndSend {
                token_type,
                bag,
                recipient,
            } => move_call(
                package,
                UTILITIES_MODULE,
                "extract_and_send_to",
                vec![token_type.clone()],
                &[*bag, *recipient],
            ),
            Operation::DestroyEmptyBag { bag } => {
                move_call(framework, "bag", "destroy_empty", vec![], &[*bag])
            }
            Operation::MergeCoins {
                destination,
                sources,
            } => PtbCommand::MergeCoins {
                destination: (*destination).into(),
                sources: sources.iter().map(|s| (*s).into()).collect(),
            },
            Operation::TransferObjects { objects, recipient } => PtbCommand::TransferObjects {
                objects: objects.iter().map(|o| (*o).into()).collect(),
                address: (*recipient).into(),
            },
        }
    }
}

fn move_call(
    package: String,
    module: &str,
    function: &str,
    type_arguments: Vec<String>,
    args: &[Argument],
) -> PtbCommand {
    PtbCommand::MoveCall {
        package,
        module: module.to_string(),
        function: function.to_string(),
        type_arguments,
        arguments: args.iter().map(|a| (*a).into()).collect(),
    }
}

impl fmt::Display for MigrationGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, input) in self.inputs.iter().enumerate() {
            match input {
                GraphInput::Address(a) => writeln!(f, "input {}: address {}", i, a.to_hex_literal())?,
                GraphInput::Object(id) => writeln!(f, "input {}: object {}", i, id.to_hex_literal())?,
            }
        }
        for (k, op) in self.operations.iter().enumerate() {
            writeln!(f, "{:>3}: {}", k, op)?;
        }
        Ok(())
    }
}
