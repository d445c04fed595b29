//! Reconciliation runs against an in-memory store.
//!
//! Covers the ordering, fail-fast and idempotency guarantees of a run, using
//! both the record-only executor and the executor that writes real records.

mod common;

use common::{DocumentBuilder, NetworkBuilder, TenantBuilder, TestHarness};

use netcfg::config::Direction;
use netcfg::executor::{NetworkRecord, RecordingExecutor};
use netcfg::reconcile::{ReconcileError, RunOptions, Stage};
use netcfg::store::{EntityKind, StateStore};

fn apply() -> RunOptions {
    RunOptions::default()
}

fn remove() -> RunOptions {
    RunOptions {
        direction: Direction::Remove,
        ..RunOptions::default()
    }
}

fn sample_document() -> netcfg::Document {
    DocumentBuilder::new()
        .tenant(
            TenantBuilder::new("t1")
                .network(
                    NetworkBuilder::new("n1")
                        .container("c1", "hostA")
                        .container("c2", "hostB"),
                )
                .network(NetworkBuilder::new("n2").host_native("hostC", "eth2")),
        )
        .tenant(TenantBuilder::new("t2"))
        .build()
}

#[tokio::test]
async fn test_additive_order_is_depth_first() {
    let harness = TestHarness::recording(RecordingExecutor::new());

    harness.run(&sample_document(), apply()).await.unwrap();

    assert_eq!(
        harness.labels(),
        vec![
            "create tenant 't1'",
            "create network 'n1'",
            "create endpoint 'n1-c1'",
            "create endpoint 'n1-c2'",
            "create network 'n2'",
            "create endpoint 'hostC-native-intf'",
            "create tenant 't2'",
        ]
    );
}

#[tokio::test]
async fn test_wait_follows_every_successful_operation() {
    let harness = TestHarness::recording(RecordingExecutor::new());

    let report = harness.run(&sample_document(), apply()).await.unwrap();

    assert_eq!(harness.wait.count(), report.operations.len());
    assert_eq!(harness.wait.settled()[0], (EntityKind::Tenant, "t1".to_string()));
}

/// Fail-fast cases: the k-th operation fails, so exactly k operations are
/// issued and k-1 are reported as done.
struct FailFastCase {
    name: &'static str,
    options: fn() -> RunOptions,
    fail_at: usize,
    stage: Stage,
    failed_id: &'static str,
}

const FAIL_FAST_CASES: &[FailFastCase] = &[
    FailFastCase {
        name: "first_tenant",
        options: apply,
        fail_at: 1,
        stage: Stage::Additive,
        failed_id: "t1",
    },
    FailFastCase {
        name: "second_network",
        options: apply,
        fail_at: 5,
        stage: Stage::Additive,
        failed_id: "n2",
    },
    FailFastCase {
        name: "last_tenant",
        options: apply,
        fail_at: 7,
        stage: Stage::Additive,
        failed_id: "t2",
    },
    FailFastCase {
        name: "destructive_second_endpoint",
        options: remove,
        fail_at: 2,
        stage: Stage::Destructive,
        failed_id: "n1-c2",
    },
];

#[tokio::test]
async fn test_fail_fast_cases() {
    for case in FAIL_FAST_CASES {
        let harness = TestHarness::recording(RecordingExecutor::failing_at(case.fail_at));

        let err = harness
            .run(&sample_document(), (case.options)())
            .await
            .unwrap_err();

        assert_eq!(
            harness.labels().len(),
            case.fail_at,
            "case '{}': wrong number of issued operations",
            case.name
        );
        assert_eq!(
            harness.wait.count(),
            case.fail_at - 1,
            "case '{}': wait must only follow successes",
            case.name
        );
        match err {
            ReconcileError::OperationFailed {
                stage, step, id, ..
            } => {
                assert_eq!(stage, case.stage, "case '{}'", case.name);
                assert_eq!(step, case.fail_at, "case '{}'", case.name);
                assert_eq!(id, case.failed_id, "case '{}'", case.name);
            }
            other => panic!("case '{}': unexpected error {:?}", case.name, other),
        }
    }
}

#[tokio::test]
async fn test_apply_writes_records_to_store() {
    let harness = TestHarness::new();

    harness.run(&sample_document(), apply()).await.unwrap();

    assert_eq!(
        harness.ids(EntityKind::Tenant).await.into_iter().collect::<Vec<_>>(),
        vec!["t1", "t2"]
    );
    assert_eq!(
        harness.ids(EntityKind::Network).await.into_iter().collect::<Vec<_>>(),
        vec!["n1", "n2"]
    );
    assert_eq!(
        harness.ids(EntityKind::Endpoint).await.into_iter().collect::<Vec<_>>(),
        vec!["hostC-native-intf", "n1-c1", "n1-c2"]
    );
}

#[tokio::test]
async fn test_idempotent_rerun_only_recreates_endpoints() {
    let harness = TestHarness::new();
    let doc = sample_document();
    let options = RunOptions {
        idempotent: true,
        ..RunOptions::default()
    };

    let first = harness.run(&doc, options).await.unwrap();
    let second = harness.run(&doc, options).await.unwrap();

    assert_eq!(first.created(), 7);
    assert!(first.skipped.is_empty());

    // t1 and its networks are skipped; t2 declares no networks so it is
    // always created; endpoints are always created.
    assert_eq!(second.skipped.len(), 3);
    assert_eq!(second.created(), 4);
    assert!(second
        .operations
        .iter()
        .all(|op| op.kind == EntityKind::Endpoint || op.id == "t2"));
}

#[tokio::test]
async fn test_prune_removes_stale_before_applying() {
    let harness = TestHarness::new();
    harness.seed(EntityKind::Tenant, "old-tenant").await;
    harness.seed(EntityKind::Network, "old-net").await;
    harness.seed(EntityKind::Endpoint, "old-net-c9").await;

    let options = RunOptions {
        prune_stale: true,
        ..RunOptions::default()
    };
    let report = harness.run(&sample_document(), options).await.unwrap();

    assert_eq!(report.pruned.len(), 3);
    assert!(report.prune_failures.is_empty());
    assert!(!harness.ids(EntityKind::Tenant).await.contains("old-tenant"));
    assert!(!harness.ids(EntityKind::Network).await.contains("old-net"));
    assert!(harness.ids(EntityKind::Endpoint).await.contains("n1-c1"));
}

#[tokio::test]
async fn test_prune_failure_is_reported_and_run_continues() {
    let harness = TestHarness::recording(RecordingExecutor::failing_on(["old-net"]));
    harness.seed(EntityKind::Network, "old-net").await;
    harness.seed(EntityKind::Tenant, "old-tenant").await;

    let options = RunOptions {
        prune_stale: true,
        ..RunOptions::default()
    };
    let report = harness.run(&sample_document(), options).await.unwrap();

    assert_eq!(report.prune_failures.len(), 1);
    assert_eq!(report.prune_failures[0].kind, EntityKind::Network);
    assert_eq!(report.pruned.len(), 1);
    assert_eq!(report.created(), 7);
}

#[tokio::test]
async fn test_remove_after_apply() {
    let harness = TestHarness::new();
    harness.run(&sample_document(), apply()).await.unwrap();

    let teardown = DocumentBuilder::new()
        .tenant(TenantBuilder::new("t1").network(NetworkBuilder::new("n1").container("c1", "hostA")))
        .tenant(TenantBuilder::new("t2"))
        .build();
    let report = harness.run(&teardown, remove()).await.unwrap();

    assert_eq!(report.deleted(), 2);
    assert!(!harness.ids(EntityKind::Endpoint).await.contains("n1-c1"));
    assert!(harness.ids(EntityKind::Endpoint).await.contains("n1-c2"));
    assert!(harness.ids(EntityKind::Network).await.contains("n1"));
    assert!(!harness.ids(EntityKind::Tenant).await.contains("t2"));
}

#[tokio::test]
async fn test_remove_of_parent_with_children_is_rejected() {
    let harness = TestHarness::new();
    harness.run(&sample_document(), apply()).await.unwrap();

    // n2 is listed without endpoints, but the store still holds one.
    let teardown = DocumentBuilder::new()
        .tenant(TenantBuilder::new("t1").network(NetworkBuilder::new("n2")))
        .build();
    let err = harness.run(&teardown, remove()).await.unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::OperationFailed {
            stage: Stage::Destructive,
            step: 1,
            kind: EntityKind::Network,
            ..
        }
    ));
}

#[tokio::test]
async fn test_empty_document_with_prune_clears_store() {
    let harness = TestHarness::new();
    harness.run(&sample_document(), apply()).await.unwrap();

    let options = RunOptions {
        prune_stale: true,
        ..RunOptions::default()
    };
    let report = harness
        .run(&DocumentBuilder::new().build(), options)
        .await
        .unwrap();

    assert_eq!(report.pruned.len(), 7);
    assert!(report.operations.is_empty());
    for kind in EntityKind::ALL {
        assert!(harness.ids(kind).await.is_empty());
    }
}

#[tokio::test]
async fn test_network_moved_between_tenants_converges() {
    let harness = TestHarness::new();
    let before = DocumentBuilder::new()
        .tenant(TenantBuilder::new("told").network(NetworkBuilder::new("n1").container("c1", "h")))
        .build();
    harness.run(&before, apply()).await.unwrap();

    let after = DocumentBuilder::new()
        .tenant(TenantBuilder::new("tnew").network(NetworkBuilder::new("n1").container("c1", "h")))
        .build();
    let options = RunOptions {
        prune_stale: true,
        idempotent: true,
        ..RunOptions::default()
    };

    // The old tenant still owns n1 while the prune pass runs, so its delete
    // is refused once; the additive pass then hands n1 to the new tenant.
    let first = harness.run(&after, options).await.unwrap();
    assert_eq!(first.prune_failures.len(), 1);
    assert_eq!(first.prune_failures[0].id, "told");
    assert!(first
        .operations
        .iter()
        .any(|op| op.kind == EntityKind::Network && op.id == "n1"));

    let raw = harness.store.read("/netcfg/config/nets/n1").await.unwrap();
    let record: NetworkRecord = serde_json::from_slice(&raw).unwrap();
    assert_eq!(record.tenant, "tnew");

    let second = harness.run(&after, options).await.unwrap();
    assert!(second.prune_failures.is_empty());
    assert_eq!(second.pruned.len(), 1);
    assert_eq!(second.pruned[0].id, "told");
    assert_eq!(
        harness.ids(EntityKind::Tenant).await.into_iter().collect::<Vec<_>>(),
        vec!["tnew"]
    );

    let third = harness.run(&after, options).await.unwrap();
    assert!(third.pruned.is_empty());
    assert!(third.prune_failures.is_empty());
    assert_eq!(third.skipped.len(), 2);
}
