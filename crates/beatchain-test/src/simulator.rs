//! In-memory network simulator
//!
//! Nodes are wired together with in-memory session pairs, so the full
//! broadcast and receive loops run without sockets.

use std::time::Duration;

use beatchain_core::{BeatResult, Chain};
use beatchain_runtime::{NodeConfig, PeerId, SyncNode};
use beatchain_transport::{PeerSession, SessionReader, SessionWriter};
use beatchain_wire::{decode_chain, encode_chain};

/// Poll interval used while waiting for the network to settle
const SETTLE_POLL: Duration = Duration::from_millis(10);

/// Group of nodes connected by in-memory sessions
pub struct SimulatedNetwork {
    nodes: Vec<SyncNode>,
}

impl SimulatedNetwork {
    /// Create `count` unconnected nodes sharing one configuration
    pub fn new(count: usize, config: NodeConfig) -> Self {
        SimulatedNetwork {
            nodes: (0..count).map(|_| SyncNode::new(config.clone())).collect(),
        }
    }

    /// Wrap already constructed nodes
    pub fn from_nodes(nodes: Vec<SyncNode>) -> Self {
        SimulatedNetwork { nodes }
    }

    /// Nodes connected in a line: 0 - 1 - 2 - ...
    pub fn line(count: usize, config: NodeConfig) -> Self {
        let net = Self::new(count, config);
        for i in 1..count {
            net.connect(i - 1, i);
        }
        net
    }

    /// Every node connected to every other node
    pub fn full_mesh(count: usize, config: NodeConfig) -> Self {
        let net = Self::new(count, config);
        for a in 0..count {
            for b in (a + 1)..count {
                net.connect(a, b);
            }
        }
        net
    }

    /// Connect node `a` and node `b`. Returns the peer ids on each side.
    pub fn connect(&self, a: usize, b: usize) -> (PeerId, PeerId) {
        let (sa, sb) = PeerSession::pair();
        let on_a = self.nodes[a].attach(sa, format!("sim-{}", b));
        let on_b = self.nodes[b].attach(sb, format!("sim-{}", a));
        (on_a, on_b)
    }

    /// Attach a hand-driven peer to node `index`
    pub fn attach_raw(&self, index: usize) -> RawPeer {
        let (local, remote) = PeerSession::pair();
        let peer = self.nodes[index].attach(local, "raw");
        let (reader, writer) = remote.split();
        RawPeer {
            peer,
            reader,
            writer,
        }
    }

    pub fn node(&self, index: usize) -> &SyncNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[SyncNode] {
        &self.nodes
    }

    /// Chain length on every node
    pub fn lengths(&self) -> Vec<usize> {
        self.nodes.iter().map(|n| n.store().len()).collect()
    }

    /// True if every node holds an identical chain
    pub fn is_converged(&self) -> bool {
        let mut snapshots = self.nodes.iter().map(|n| n.store().snapshot());
        match snapshots.next() {
            Some(first) => snapshots.all(|s| s == first),
            None => true,
        }
    }

    /// Wait until every node holds the same chain of at least `min_len` records
    pub async fn wait_converged(&self, min_len: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.is_converged() && self.lengths().iter().all(|len| *len >= min_len) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }

    /// Stop every node
    pub fn shutdown(&self) {
        for node in &self.nodes {
            node.shutdown();
        }
    }
}

impl Drop for SimulatedNetwork {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Far end of a session attached to a simulated node, driven by the test
pub struct RawPeer {
    /// Id of this session on the node
    pub peer: PeerId,
    reader: SessionReader,
    writer: SessionWriter,
}

impl RawPeer {
    pub async fn send_line(&mut self, line: &str) -> BeatResult<()> {
        self.writer.send_line(line).await
    }

    pub async fn send_chain(&mut self, chain: &Chain) -> BeatResult<()> {
        let line = encode_chain(chain)?;
        self.writer.send_line(&line).await
    }

    /// Next chain sent by the node, or `None` if the node closed the session
    pub async fn recv_chain(&mut self) -> BeatResult<Option<Chain>> {
        match self.reader.recv_line().await? {
            Some(line) => decode_chain(&line).map(Some),
            None => Ok(None),
        }
    }
}
