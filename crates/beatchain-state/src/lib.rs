//! beatchain State Engine - Chain storage and reconciliation
//!
//! This crate implements:
//! - The process-wide chain store behind a single lock
//! - Local append with link validation
//! - Longest-chain-wins replacement
//! - Merge policy for inbound candidate chains

pub mod store;
pub mod merge;

pub use store::*;
pub use merge::*;
