//! beatchain Wire Protocol - Line-oriented chain messages
//!
//! One message is the whole chain, encoded as a JSON array of records on a
//! single line. There is no length prefix, checksum, or version field; the
//! newline delimiter is added by the session framing.

pub mod message;

pub use message::*;
