//! beatchain Node - per-peer sync loops and the local append path

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use beatchain_core::{BeatError, BeatResult, Chain, Record};
use beatchain_state::{merge_candidate, ChainStore, MergeOutcome};
use beatchain_transport::{PeerSession, SessionReader, SessionWriter, TcpTransport};
use beatchain_wire::{decode_chain, encode_chain};

use crate::peer::{Outbound, PeerHandle};
use crate::{CloseReason, NodeConfig, PeerId};

/// Counters for sync activity since the node was created
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub broadcasts_sent: u64,
    pub pushes_dropped: u64,
    pub chains_adopted: u64,
    pub chains_not_longer: u64,
    pub chains_rejected: u64,
    pub decode_errors: u64,
    pub records_appended: u64,
    pub peers_attached: u64,
    pub peers_closed: u64,
}

/// Chain changes observed by the node
#[derive(Clone, Debug)]
pub enum ChainEvent {
    /// A local measurement was appended
    Appended { record: Record, chain: Chain },
    /// A peer's longer chain replaced ours
    Adopted {
        peer: PeerId,
        previous_len: usize,
        new_len: usize,
        chain: Chain,
    },
    PeerAttached { peer: PeerId, label: String },
    PeerClosed {
        peer: PeerId,
        label: String,
        reason: CloseReason,
    },
}

struct NodeInner {
    store: Arc<ChainStore>,
    config: NodeConfig,
    peers: Mutex<HashMap<PeerId, PeerHandle>>,
    next_peer: AtomicU64,
    events: broadcast::Sender<ChainEvent>,
    stats: Mutex<SyncStats>,
    shutdown: CancellationToken,
}

/// beatchain node - replicates one chain store across attached peers.
///
/// Cloning is cheap; clones share the same store, peers, and shutdown token.
#[derive(Clone)]
pub struct SyncNode {
    inner: Arc<NodeInner>,
}

impl SyncNode {
    /// Create a node with a fresh genesis chain
    pub fn new(config: NodeConfig) -> Self {
        Self::with_store(Arc::new(ChainStore::new()), config)
    }

    /// Create a node around an existing store
    pub fn with_store(store: Arc<ChainStore>, config: NodeConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        SyncNode {
            inner: Arc::new(NodeInner {
                store,
                config,
                peers: Mutex::new(HashMap::new()),
                next_peer: AtomicU64::new(1),
                events,
                stats: Mutex::new(SyncStats::default()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn store(&self) -> &Arc<ChainStore> {
        &self.inner.store
    }

    pub fn config(&self) -> &NodeConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> SyncStats {
        self.inner.stats.lock().clone()
    }

    /// Subscribe to chain events
    pub fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.inner.events.subscribe()
    }

    /// Number of attached peers
    pub fn peer_count(&self) -> usize {
        self.inner.peers.lock().len()
    }

    /// Attached peers and their labels
    pub fn peers(&self) -> Vec<(PeerId, String)> {
        let mut peers: Vec<_> = self
            .inner
            .peers
            .lock()
            .iter()
            .map(|(id, handle)| (*id, handle.label.clone()))
            .collect();
        peers.sort();
        peers
    }

    /// Whether `shutdown` has been called
    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Attach a connected session and start its broadcast and receive loops.
    ///
    /// Both loops share one cancellation token: when either ends, the other
    /// is stopped and the peer is removed. Must be called inside a Tokio
    /// runtime.
    pub fn attach(&self, session: PeerSession, label: impl Into<String>) -> PeerId {
        let peer = PeerId(self.inner.next_peer.fetch_add(1, Ordering::Relaxed));
        let label = label.into();
        let (reader, writer) = session.split();
        let (outbound, queued) = mpsc::channel(self.inner.config.outbound_capacity.max(1));
        let token = self.inner.shutdown.child_token();

        self.inner.peers.lock().insert(
            peer,
            PeerHandle {
                label: label.clone(),
                outbound,
                token: token.clone(),
            },
        );
        self.inner.stats.lock().peers_attached += 1;
        tracing::info!(%peer, %label, "peer attached");
        self.emit(ChainEvent::PeerAttached { peer, label });

        tokio::spawn(self.clone().broadcast_loop(peer, writer, queued, token.clone()));
        tokio::spawn(self.clone().receive_loop(peer, reader, token));

        peer
    }

    /// Stop a peer's loops and drop it from the table
    pub fn detach(&self, peer: PeerId) {
        self.close_peer(peer, CloseReason::Cancelled);
    }

    /// Stop every peer and the accept loop
    pub fn shutdown(&self) {
        tracing::info!(peers = self.peer_count(), "shutting down");
        self.inner.shutdown.cancel();
    }

    /// Accept inbound sessions until shutdown, attaching each one
    pub async fn serve(&self, transport: TcpTransport) {
        tracing::info!(addr = %transport.local_addr(), "listening for peers");
        loop {
            let accepted = tokio::select! {
                _ = self.inner.shutdown.cancelled() => break,
                accepted = transport.accept() => accepted,
            };

            match accepted {
                Ok((session, addr)) => {
                    self.attach(session, addr.to_string());
                }
                Err(e) => {
                    tracing::warn!("accept failed: {}", e);
                    tokio::time::sleep(self.inner.config.accept_backoff).await;
                }
            }
        }
    }

    /// Local-append path: append `measurement` on top of the current tail
    /// and push the new chain to every peer.
    ///
    /// A rejected record leaves the store unchanged and nothing is sent.
    pub fn submit_measurement(&self, measurement: i64) -> BeatResult<Record> {
        let record = match self.inner.store.append_measurement(measurement) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(measurement, error = %e, "measurement dropped");
                return Err(e);
            }
        };

        self.inner.stats.lock().records_appended += 1;
        tracing::info!(index = record.index, measurement, "record appended");
        self.emit(ChainEvent::Appended {
            record: record.clone(),
            chain: self.inner.store.snapshot(),
        });

        self.broadcast_now()?;
        Ok(record)
    }

    /// Queue the current chain for every attached peer without waiting.
    ///
    /// Each peer's broadcast loop writes the queued chain. Returns the number
    /// of peers it was queued for; a peer whose queue is full is skipped and
    /// catches up on its next timed broadcast.
    pub fn broadcast_now(&self) -> BeatResult<usize> {
        let line: Arc<str> = encode_chain(&self.inner.store.snapshot())?.into();
        let peers = self.inner.peers.lock();

        let mut queued = 0;
        for (peer, handle) in peers.iter() {
            match handle.outbound.try_send(Arc::clone(&line)) {
                Ok(()) => queued += 1,
                Err(TrySendError::Full(_)) => {
                    self.inner.stats.lock().pushes_dropped += 1;
                    tracing::debug!(%peer, "outbound queue full, push dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::trace!(%peer, "peer closing, push dropped");
                }
            }
        }
        Ok(queued)
    }

    /// Process one inbound message line.
    ///
    /// Blank lines yield `Ok(None)`. Malformed data is returned as an error
    /// without touching the store.
    pub fn handle_message(&self, peer: PeerId, line: &str) -> BeatResult<Option<MergeOutcome>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let candidate = decode_chain(line)?;
        let outcome = merge_candidate(&self.inner.store, candidate, self.inner.config.merge_policy);

        match &outcome {
            MergeOutcome::Adopted {
                previous_len,
                new_len,
            } => {
                self.inner.stats.lock().chains_adopted += 1;
                self.emit(ChainEvent::Adopted {
                    peer,
                    previous_len: *previous_len,
                    new_len: *new_len,
                    chain: self.inner.store.snapshot(),
                });
            }
            MergeOutcome::NotLonger {
                current_len,
                candidate_len,
            } => {
                self.inner.stats.lock().chains_not_longer += 1;
                tracing::trace!(%peer, current_len, candidate_len, "candidate not longer");
            }
            MergeOutcome::Rejected(e) => {
                self.inner.stats.lock().chains_rejected += 1;
                tracing::warn!(%peer, "candidate rejected: {}", e);
            }
        }

        Ok(Some(outcome))
    }

    /// Sole writer for one peer: timed snapshots plus eagerly queued ones.
    ///
    /// Every write races the peer's token, so a peer that stops reading
    /// blocks only this task and `detach` still stops it.
    async fn broadcast_loop(
        self,
        peer: PeerId,
        mut writer: SessionWriter,
        mut queued: mpsc::Receiver<Outbound>,
        token: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(self.inner.config.broadcast_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        let reason = loop {
            let line: Outbound = tokio::select! {
                _ = token.cancelled() => break CloseReason::Cancelled,
                _ = ticker.tick() => match encode_chain(&self.inner.store.snapshot()) {
                    Ok(line) => line.into(),
                    Err(e) => {
                        tracing::warn!(%peer, "snapshot not encodable: {}", e);
                        continue;
                    }
                },
                next = queued.recv() => match next {
                    Some(line) => line,
                    None => break CloseReason::Cancelled,
                },
            };

            let sent = tokio::select! {
                _ = token.cancelled() => break CloseReason::Cancelled,
                sent = writer.send_line(&line) => sent,
            };

            match sent {
                Ok(()) => {
                    self.inner.stats.lock().broadcasts_sent += 1;
                    tracing::debug!(%peer, bytes = line.len(), "chain sent");
                }
                Err(e) => break CloseReason::TransportError(e.to_string()),
            }
        };

        self.close_peer(peer, reason);
    }

    async fn receive_loop(self, peer: PeerId, mut reader: SessionReader, token: CancellationToken) {
        let reason = loop {
            let received = tokio::select! {
                _ = token.cancelled() => break CloseReason::Cancelled,
                received = reader.recv_line() => received,
            };

            match received {
                Ok(None) => break CloseReason::PeerClosed,
                Ok(Some(line)) => {
                    if let Err(e) = self.handle_message(peer, &line) {
                        self.inner.stats.lock().decode_errors += 1;
                        tracing::warn!(%peer, "discarding malformed message: {}", e);
                    }
                }
                Err(e @ (BeatError::MessageTooLong { .. } | BeatError::InvalidWireFormat(_))) => {
                    self.inner.stats.lock().decode_errors += 1;
                    tracing::warn!(%peer, "discarding message: {}", e);
                }
                Err(e) => break CloseReason::TransportError(e.to_string()),
            }
        };

        self.close_peer(peer, reason);
    }

    fn close_peer(&self, peer: PeerId, reason: CloseReason) {
        let Some(handle) = self.inner.peers.lock().remove(&peer) else {
            return;
        };
        handle.token.cancel();
        self.inner.stats.lock().peers_closed += 1;

        match &reason {
            CloseReason::TransportError(_) => {
                tracing::warn!(%peer, label = %handle.label, %reason, "peer closed")
            }
            _ => tracing::info!(%peer, label = %handle.label, %reason, "peer closed"),
        }
        self.emit(ChainEvent::PeerClosed {
            peer,
            label: handle.label,
            reason,
        });
    }

    fn emit(&self, event: ChainEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

impl std::fmt::Debug for SyncNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncNode")
            .field("chain_len", &self.inner.store.len())
            .field("peers", &self.peer_count())
            .finish_non_exhaustive()
    }
}
