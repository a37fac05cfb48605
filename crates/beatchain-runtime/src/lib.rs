//! beatchain Runtime - Chain replication over peer sessions
//!
//! Every attached peer gets two independent tasks:
//! 1. Broadcast loop: send the full chain on a fixed interval
//! 2. Receive loop: decode inbound chains and adopt strictly longer ones
//!
//! Local measurements are appended through the node and pushed to every
//! peer immediately, in addition to the timed broadcast.

pub mod config;
pub mod peer;
pub mod node;

pub use config::*;
pub use peer::*;
pub use node::*;
