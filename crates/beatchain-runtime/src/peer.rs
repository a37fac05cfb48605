//! Peer bookkeeping

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Local handle for one attached peer session
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PeerId(pub u64);

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Peer({})", self.0)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Why a peer's loops stopped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// Remote side ended the stream
    PeerClosed,
    /// Read or write on the session failed
    TransportError(String),
    /// Node shut down or the peer was detached
    Cancelled,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => write!(f, "peer closed"),
            CloseReason::TransportError(e) => write!(f, "transport error: {}", e),
            CloseReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Encoded chain line queued for a peer's broadcast loop
pub(crate) type Outbound = Arc<str>;

/// Entry in the node's peer table
pub(crate) struct PeerHandle {
    pub label: String,
    pub outbound: mpsc::Sender<Outbound>,
    pub token: CancellationToken,
}
