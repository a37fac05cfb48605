//! End-to-end replication scenarios
//!
//! Full nodes exchange chains over in-memory sessions with the real
//! broadcast and receive loops running.

use std::sync::Arc;
use std::time::Duration;

use beatchain_crypto::{is_valid, verify_chain};
use beatchain_runtime::{NodeConfig, SyncNode};
use beatchain_state::{ChainStore, MergePolicy};

use crate::{forged_chain, valid_chain, SimulatedNetwork};

const SETTLE: Duration = Duration::from_secs(3);

fn fast_config() -> NodeConfig {
    NodeConfig {
        broadcast_interval: Duration::from_millis(20),
        ..NodeConfig::default()
    }
}

fn quiet_config() -> NodeConfig {
    NodeConfig {
        broadcast_interval: Duration::from_secs(3600),
        ..NodeConfig::default()
    }
}

async fn wait_for(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + SETTLE;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[tokio::test]
async fn genesis_node_adopts_longer_peer_chain() {
    let net = SimulatedNetwork::new(1, quiet_config());
    let mut raw = net.attach_raw(0);
    let candidate = valid_chain(3);

    raw.send_chain(&candidate).await.unwrap();

    assert!(wait_for(|| net.node(0).store().len() == 3).await);
    assert_eq!(net.node(0).store().snapshot(), candidate);
}

#[tokio::test]
async fn longer_local_chain_survives_shorter_peer_chain() {
    let store = Arc::new(ChainStore::from_chain(valid_chain(5)).unwrap());
    let node = SyncNode::with_store(Arc::clone(&store), quiet_config());
    let net = SimulatedNetwork::from_nodes(vec![node]);
    let before = store.snapshot();

    let mut raw = net.attach_raw(0);
    raw.send_chain(&valid_chain(3)).await.unwrap();

    assert!(wait_for(|| net.node(0).stats().chains_not_longer == 1).await);
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn local_measurement_extends_tail_and_is_pushed() {
    let store = Arc::new(ChainStore::from_chain(valid_chain(5)).unwrap());
    let node = SyncNode::with_store(Arc::clone(&store), quiet_config());
    let net = SimulatedNetwork::from_nodes(vec![node]);
    let mut raw = net.attach_raw(0);

    let tail = store.last().unwrap();
    assert_eq!(tail.index, 4);

    let record = net.node(0).submit_measurement(72).unwrap();
    assert_eq!(record.index, 5);
    assert_eq!(record.prev_hash, tail.hash);
    assert!(is_valid(&record, &tail));

    let pushed = raw.recv_chain().await.unwrap().unwrap();
    assert_eq!(pushed.len(), 6);
    assert_eq!(pushed.last(), Some(&record));
}

#[tokio::test]
async fn malformed_message_only_discards_that_message() {
    let net = SimulatedNetwork::new(2, fast_config());
    net.connect(0, 1);
    let mut raw = net.attach_raw(0);

    raw.send_line("{\"index\": oops").await.unwrap();
    raw.send_line("[{\"index\":0}]").await.unwrap();
    raw.send_chain(&valid_chain(4)).await.unwrap();

    assert!(net.wait_converged(4, SETTLE).await);
    let stats = net.node(0).stats();
    assert_eq!(stats.decode_errors, 2);
    assert_eq!(net.node(0).peer_count(), 2);
}

#[tokio::test]
async fn line_topology_converges_through_relay() {
    let net = SimulatedNetwork::line(3, fast_config());

    for m in [66, 67, 68, 69] {
        net.node(0).submit_measurement(m).unwrap();
    }

    assert!(net.wait_converged(5, SETTLE).await);
    let chain = net.node(2).store().snapshot();
    assert!(verify_chain(&chain).is_ok());
    let measurements: Vec<i64> = chain.iter().skip(1).map(|r| r.measurement).collect();
    assert_eq!(measurements, vec![66, 67, 68, 69]);
}

#[tokio::test]
async fn forged_chain_rejected_when_verifying() {
    let net = SimulatedNetwork::full_mesh(2, fast_config());
    net.node(1).submit_measurement(70).unwrap();
    assert!(net.wait_converged(2, SETTLE).await);

    let mut raw = net.attach_raw(0);
    raw.send_chain(&forged_chain(10, 4)).await.unwrap();

    assert!(wait_for(|| net.node(0).stats().chains_rejected >= 1).await);
    assert_eq!(net.lengths(), vec![2, 2]);
    assert!(verify_chain(&net.node(0).store().snapshot()).is_ok());
}

#[tokio::test]
async fn forged_chain_spreads_under_length_only() {
    let config = NodeConfig {
        merge_policy: MergePolicy::LengthOnly,
        ..fast_config()
    };
    let net = SimulatedNetwork::full_mesh(2, config);
    let mut raw = net.attach_raw(0);
    let forged = forged_chain(6, 2);

    raw.send_chain(&forged).await.unwrap();

    assert!(net.wait_converged(6, SETTLE).await);
    assert_eq!(net.node(1).store().snapshot(), forged);
}

#[tokio::test]
async fn closed_peer_does_not_disturb_others() {
    let net = SimulatedNetwork::full_mesh(3, fast_config());
    let raw = net.attach_raw(1);
    assert_eq!(net.node(1).peer_count(), 3);

    drop(raw);
    assert!(wait_for(|| net.node(1).peer_count() == 2).await);

    net.node(0).submit_measurement(90).unwrap();
    assert!(net.wait_converged(2, SETTLE).await);
}

#[tokio::test]
async fn concurrent_submissions_never_corrupt_chains() {
    let net = SimulatedNetwork::full_mesh(3, fast_config());

    let mut tasks = Vec::new();
    for (i, node) in net.nodes().iter().enumerate() {
        let node = node.clone();
        tasks.push(tokio::spawn(async move {
            for m in 0..10 {
                node.submit_measurement((i as i64) * 100 + m).unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    for node in net.nodes() {
        let chain = node.store().snapshot();
        assert!(chain.len() >= 11);
        assert!(verify_chain(&chain).is_ok());
        for (i, record) in chain.iter().enumerate() {
            assert_eq!(record.index, i as u64);
        }
    }
}

#[tokio::test]
async fn periodic_broadcast_reaches_late_joiner() {
    let net = SimulatedNetwork::new(2, fast_config());
    for m in [1, 2, 3] {
        net.node(0).submit_measurement(m).unwrap();
    }
    assert_eq!(net.lengths(), vec![4, 1]);

    net.connect(0, 1);
    assert!(net.wait_converged(4, SETTLE).await);
}
