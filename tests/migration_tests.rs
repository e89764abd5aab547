//! End-to-end migration graph tests.
//!
//! Payloads go through validation, bag resolution against an in-memory
//! source, graph construction and lowering, exactly as the CLI drives them.

mod common;

use common::{addr, basic_output, nft_output, MockBagSource, OutputFixture};
use stardust_migration::migration::{Argument, GraphError, MigrationError, Operation, OutputKind};
use stardust_migration::planner::{plan_migration, SkipReason};
use stardust_migration::types::{PtbArgument, PtbCommand, TransactionInput};
use stardust_migration::{build_migration, MigrationConfig};

const DEST: &str = "0xd0d0";

#[tokio::test]
async fn test_single_basic_output_without_tokens() {
    let source = MockBagSource::new();
    let graph = build_migration(
        &source,
        &MigrationConfig::default(),
        addr(DEST),
        &[basic_output("0x1")],
        &[],
    )
    .await
    .unwrap();

    let labels: Vec<_> = graph.operations().iter().map(|op| op.label()).collect();
    assert_eq!(
        labels,
        vec!["extract_assets", "balance_to_coin", "destroy_empty_bag", "transfer_objects"]
    );
    assert_eq!(
        graph.operations()[3],
        Operation::TransferObjects {
            objects: vec![Argument::Result(1)],
            recipient: Argument::Input(0),
        }
    );
    assert_eq!(source.calls(), 0, "empty bags are never enumerated");
}

#[tokio::test]
async fn test_bag_threads_through_every_token_type() {
    let source = MockBagSource::new().with_bag("0xb0", &["0xa::a::A", "0xb::b::B", "0xc::c::C"]);
    let config = MigrationConfig::default().with_page_size(2);
    let output = OutputFixture::new("0x1").bag("0xb0", 3).basic();

    let graph = build_migration(&source, &config, addr(DEST), &[output], &[])
        .await
        .unwrap();
    assert_eq!(source.calls(), 2, "three entries at two per page");

    let ops = graph.operations();
    let expected_bags = [
        Argument::NestedResult(0, 1),
        Argument::Result(2),
        Argument::Result(3),
    ];
    for (i, (token_type, bag)) in ["0xa::a::A", "0xb::b::B", "0xc::c::C"]
        .iter()
        .zip(expected_bags)
        .enumerate()
    {
        assert_eq!(
            ops[2 + i],
            Operation::ExtractAndSend {
                token_type: token_type.to_string(),
                bag,
                recipient: Argument::Input(0),
            }
        );
    }
    assert_eq!(
        ops[5],
        Operation::DestroyEmptyBag {
            bag: Argument::Result(4)
        }
    );
    assert_eq!(graph.count("destroy_empty_bag"), 1);
}

#[tokio::test]
async fn test_basic_and_nft_outputs_aggregate_into_one_transfer() {
    let source = MockBagSource::new();
    let graph = build_migration(
        &source,
        &MigrationConfig::default(),
        addr(DEST),
        &[basic_output("0x1"), basic_output("0x2")],
        &[nft_output("0x3")],
    )
    .await
    .unwrap();

    let ops = graph.operations();
    assert_eq!(ops.len(), 11);
    assert_eq!(
        ops[6],
        Operation::ExtractAssets {
            kind: OutputKind::Nft,
            output: Argument::Input(3),
        }
    );
    assert_eq!(
        ops[9],
        Operation::MergeCoins {
            destination: Argument::Result(1),
            sources: vec![Argument::Result(4), Argument::Result(7)],
        }
    );
    assert_eq!(
        ops[10],
        Operation::TransferObjects {
            objects: vec![Argument::Result(1), Argument::NestedResult(6, 2)],
            recipient: Argument::Input(0),
        }
    );
    assert_eq!(graph.count("merge_coins"), 1);
    assert_eq!(graph.count("transfer_objects"), 1);
}

#[tokio::test]
async fn test_lowered_transaction_shape() {
    let source = MockBagSource::new().with_bag("0xb0", &["0xa::a::A"]);
    let output = OutputFixture::new("0x1").bag("0xb0", 1).nft();
    let graph = build_migration(&source, &MigrationConfig::default(), addr(DEST), &[], &[output])
        .await
        .unwrap();
    let ptb = graph.to_programmable_transaction();

    assert_eq!(ptb.inputs.len(), 2);
    match &ptb.inputs[0] {
        TransactionInput::Pure { bytes } => assert_eq!(bytes, &addr(DEST).to_vec()),
        other => panic!("expected pure address input, got {other:?}"),
    }
    assert!(matches!(
        &ptb.inputs[1],
        TransactionInput::Object { object_id } if object_id.ends_with("01")
    ));

    let labels: Vec<_> = ptb.commands.iter().map(PtbCommand::label).collect();
    assert_eq!(
        labels,
        vec![
            "0x107a::nft_output::extract_assets",
            "0x2::coin::from_balance",
            "0x107a::utilities::extract_and_send_to",
            "0x2::bag::destroy_empty",
            "TransferObjects",
        ]
    );
    match &ptb.commands[2] {
        PtbCommand::MoveCall {
            type_arguments,
            arguments,
            ..
        } => {
            assert_eq!(type_arguments, &vec!["0xa::a::A".to_string()]);
            assert_eq!(
                arguments,
                &vec![
                    PtbArgument::NestedResult {
                        index: 0,
                        result_index: 1
                    },
                    PtbArgument::Input { index: 0 },
                ]
            );
        }
        other => panic!("expected move call, got {other:?}"),
    }
    assert_eq!(ptb.move_call_count(), 4);
}

#[tokio::test]
async fn test_same_batch_builds_identical_transactions() {
    let source = MockBagSource::new()
        .with_bag("0xb0", &["0xa::a::A", "0xb::b::B"])
        .with_bag("0xb1", &["0xc::c::C"]);
    let basic = [
        OutputFixture::new("0x1").bag("0xb0", 2).basic(),
        OutputFixture::new("0x2").bag("0xb1", 1).basic(),
    ];
    let nft = [OutputFixture::new("0x3").bag("0xb1", 1).nft()];
    let config = MigrationConfig::default().with_resolve_concurrency(3);

    let first = build_migration(&source, &config, addr(DEST), &basic, &nft)
        .await
        .unwrap();
    let second = build_migration(&source, &config, addr(DEST), &basic, &nft)
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.to_programmable_transaction().to_json_pretty().unwrap(),
        second.to_programmable_transaction().to_json_pretty().unwrap()
    );
    assert_eq!(first.count("extract_and_send"), 4);
}

#[tokio::test]
async fn test_invalid_output_fails_before_any_lookup() {
    let source = MockBagSource::new().with_bag("0xb0", &["0xa::a::A"]);
    let good = OutputFixture::new("0x1").bag("0xb0", 1).basic();
    let mut bad = basic_output("0x2");
    if let Some(stardust_migration::types::ObjectContent::MoveObject { fields, .. }) =
        bad.content.as_mut()
    {
        fields.as_object_mut().unwrap().remove("balance");
    }

    let err = build_migration(
        &source,
        &MigrationConfig::default(),
        addr(DEST),
        &[good, bad],
        &[],
    )
    .await
    .unwrap_err();
    match err {
        MigrationError::Validation {
            object_id,
            source: cause,
            ..
        } => {
            assert_eq!(object_id, "0x2");
            assert!(cause.to_string().contains("balance"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_unknown_bag_fails_whole_batch() {
    let source = MockBagSource::new();
    let output = OutputFixture::new("0x1").bag("0xbad", 2).basic();
    let err = build_migration(&source, &MigrationConfig::default(), addr(DEST), &[output], &[])
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::Resolution { bag_id, .. } if bag_id == addr("0xbad")));
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let err = build_migration(
        &MockBagSource::new(),
        &MigrationConfig::default(),
        addr(DEST),
        &[],
        &[],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, MigrationError::NothingToMigrate));
}

#[tokio::test]
async fn test_plan_sets_aside_unmigratable_outputs() {
    let user = DEST;
    let other = "0x0e";
    let epoch_ms = 2_000_000;
    let basic = [
        OutputFixture::new("0x1").basic(),
        // expired at 1000s: now belongs to the return address
        OutputFixture::new("0x2").expiration(user, other, 1_000).basic(),
        // expired, returned to the user
        OutputFixture::new("0x3").expiration(other, user, 1_000).basic(),
    ];
    let nft = [OutputFixture::new("0x4").timelock(3_000).nft()];

    let source = MockBagSource::new();
    let plan = plan_migration(
        &source,
        &MigrationConfig::default(),
        addr(user),
        epoch_ms,
        &basic,
        &nft,
    )
    .await
    .unwrap();

    assert_eq!(plan.basic_outputs, vec!["0x1".to_string(), "0x3".to_string()]);
    assert!(plan.nft_outputs.is_empty());
    let reasons: Vec<String> = plan.skipped.iter().map(|s| s.reason.to_string()).collect();
    assert_eq!(reasons.len(), 2);
    assert!(reasons[0].contains("unlockable only by"));
    assert!(matches!(plan.skipped[1].reason, SkipReason::Unmigratable(_)));
    assert_eq!(plan.skipped[1].kind, OutputKind::Nft);

    let graph = plan.graph.as_ref().unwrap();
    assert_eq!(graph.count("extract_assets"), 2);
    assert_eq!(graph.count("merge_coins"), 1);
}

#[tokio::test]
async fn test_custom_package_flows_into_move_calls() {
    let config = MigrationConfig::default().with_package(addr("0xabc"));
    let object = stardust_migration::types::ObjectData::move_object(
        "0x1",
        config.basic_output_type(),
        serde_json::json!({
            "id": { "id": "0x1" },
            "balance": "5",
            "native_tokens": {
                "type": "0x2::bag::Bag",
                "fields": { "id": { "id": "0xb" }, "size": "0" }
            }
        }),
    );
    let graph = build_migration(&MockBagSource::new(), &config, addr(DEST), &[object], &[])
        .await
        .unwrap();

    let ptb = graph.to_programmable_transaction();
    assert_eq!(ptb.commands[0].label(), "0xabc::basic_output::extract_assets");
    assert_eq!(ptb.commands[1].label(), "0x2::coin::from_balance");
}

#[tokio::test]
async fn test_bag_size_disagreeing_with_entries_fails() {
    let source = MockBagSource::new().with_bag("0xb0", &["0xa::a::A"]);
    let output = OutputFixture::new("0x1").bag("0xb0", 2).basic();
    let err = build_migration(&source, &MigrationConfig::default(), addr(DEST), &[output], &[])
        .await
        .unwrap_err();
    match err {
        MigrationError::Resolution {
            bag_id,
            source: cause,
            ..
        } => {
            assert_eq!(bag_id, addr("0xb0"));
            assert!(cause.to_string().contains("declares 2 entries but holds 1"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_same_output_twice_is_rejected() {
    let source = MockBagSource::new();
    let err = build_migration(
        &source,
        &MigrationConfig::default(),
        addr(DEST),
        &[basic_output("0x1"), basic_output("0x1")],
        &[],
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        MigrationError::Construction(GraphError::DuplicateObject { object_id }) if object_id == addr("0x1")
    ));

    let err = build_migration(
        &source,
        &MigrationConfig::default(),
        addr(DEST),
        &[basic_output("0x2")],
        &[nft_output("0x2")],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, MigrationError::Construction(_)));
    assert_eq!(source.calls(), 0);
}
