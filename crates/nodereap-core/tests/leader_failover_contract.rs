//! Contract Test: Leader Failover
//!
//! Constraints verified:
//! - Controllers are probed strictly in configured order
//! - The first controller that answers becomes leader; later ones are not asked
//! - Failures before the last controller are skipped
//! - Failure of every controller (or none configured) fails the run with
//!   no node inspected and no deletion attempted
//!
//! If this test fails, leader selection is nondeterministic or failover is broken.

mod common;

use common::*;
use nodereap_core::{ClusterSpec, Error, HostConfig, locate_leader};

#[tokio::test]
async fn failing_first_controller_is_skipped() {
    let cluster = FakeCluster::new()
        .with_healthy_controller("c2")
        .with_host_id("w1", "id-A")
        .with_node("n1", "id-A");
    let spec = ClusterSpec::new(vec![
        HostConfig::controller("c1"),
        HostConfig::controller("c2"),
        HostConfig::worker("w1"),
    ]);
    let (reconciler, _events) = reconciler_for(&cluster, false);

    let report = reconciler.run(&spec).await.unwrap();

    assert_eq!(report.leader.address, "c2");
    assert_eq!(report.kept(), vec!["n1"]);

    // c1 was only ever asked to list nodes
    let c1_calls: Vec<_> = cluster
        .calls()
        .into_iter()
        .filter(|c| match c {
            Call::ListNodes(h) => h == "c1",
            Call::Describe { leader, .. } | Call::Delete { leader, .. } => leader == "c1",
            Call::MachineId(_) => false,
        })
        .collect();
    assert_eq!(c1_calls, vec![Call::ListNodes("c1".to_string())]);
}

#[tokio::test]
async fn first_healthy_controller_wins() {
    let cluster = FakeCluster::new()
        .with_healthy_controller("c1")
        .with_healthy_controller("c2")
        .with_node("n1", "id-A");
    let controllers = vec![HostConfig::controller("c1"), HostConfig::controller("c2")];

    let leader = locate_leader(&cluster, &controllers).await.unwrap();

    assert_eq!(leader.host.address, "c1");
    assert_eq!(leader.nodes, vec!["n1"]);
    assert!(!cluster.contacted_hosts().contains("c2"));
}

#[tokio::test]
async fn single_failing_controller_fails_the_run() {
    let cluster = FakeCluster::new()
        .with_host_id("w1", "id-A")
        .with_node("n1", "id-Z");
    let spec = ClusterSpec::new(vec![HostConfig::controller("c1"), HostConfig::worker("w1")]);
    let (reconciler, _events) = reconciler_for(&cluster, false);

    let err = reconciler.run(&spec).await.unwrap_err();

    match err {
        Error::NoLeader { attempted, source } => {
            assert_eq!(attempted, 1);
            assert!(source.to_string().contains("refused"));
        }
        other => panic!("expected NoLeader, got {:?}", other),
    }
    assert!(
        cluster
            .calls()
            .iter()
            .all(|c| !matches!(c, Call::Describe { .. } | Call::Delete { .. }))
    );
    assert_eq!(cluster.delete_call_count(), 0);
}

#[tokio::test]
async fn all_controllers_failing_reports_last_error() {
    let cluster = FakeCluster::new().with_node("n1", "id-Z");
    let controllers = vec![
        HostConfig::controller("c1"),
        HostConfig::controller("c2"),
        HostConfig::controller("c3"),
    ];

    let err = locate_leader(&cluster, &controllers).await.unwrap_err();

    match err {
        Error::NoLeader { attempted, source } => {
            assert_eq!(attempted, 3);
            assert!(matches!(*source, Error::RemoteExec { ref host, .. } if host == "c3"));
        }
        other => panic!("expected NoLeader, got {:?}", other),
    }
    assert_eq!(
        cluster.calls(),
        vec![
            Call::ListNodes("c1".to_string()),
            Call::ListNodes("c2".to_string()),
            Call::ListNodes("c3".to_string()),
        ]
    );
}

#[tokio::test]
async fn zero_controllers_fails_without_probing() {
    let cluster = FakeCluster::new().with_host_id("w1", "id-A");
    let spec = ClusterSpec::new(vec![HostConfig::worker("w1")]);
    let (reconciler, _events) = reconciler_for(&cluster, false);

    let err = reconciler.run(&spec).await.unwrap_err();

    assert!(matches!(err, Error::NoControllers));
    assert!(
        cluster
            .calls()
            .iter()
            .all(|c| matches!(c, Call::MachineId(_)))
    );
}
