//! TCP transport

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};

use beatchain_core::{BeatError, BeatResult};

use crate::PeerSession;

/// TCP listener handing out peer sessions
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind to a local address
    pub async fn bind(addr: SocketAddr) -> BeatResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BeatError::TransportError(e.to_string()))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| BeatError::TransportError(e.to_string()))?;

        Ok(TcpTransport {
            listener,
            local_addr,
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the next inbound peer
    pub async fn accept(&self) -> BeatResult<(PeerSession, SocketAddr)> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| BeatError::TransportError(e.to_string()))?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed for {}: {}", addr, e);
        }
        Ok((PeerSession::new(stream), addr))
    }
}

/// Open a session to a remote peer
pub async fn dial(addr: SocketAddr) -> BeatResult<PeerSession> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| BeatError::ConnectionFailed(format!("{}: {}", addr, e)))?;

    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!("set_nodelay failed for {}: {}", addr, e);
    }
    Ok(PeerSession::new(stream))
}
