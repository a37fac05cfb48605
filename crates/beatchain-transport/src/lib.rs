//! beatchain Transport Layer - Peer sessions
//!
//! This crate provides:
//! - Line-delimited sessions over any byte stream
//! - In-memory session pairs for simulation
//! - TCP listener and dialer
//!
//! Peer discovery, stream multiplexing, and encryption handshakes are not
//! handled here.

pub mod codec;
pub mod session;
pub mod tcp;

pub use codec::*;
pub use session::*;
pub use tcp::*;
