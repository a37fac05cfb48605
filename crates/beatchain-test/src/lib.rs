//! beatchain Test Harness - Simulation and protocol validation
//!
//! This crate provides:
//! - Chain fixtures (valid, random, and forged chains)
//! - In-memory multi-node network simulation
//! - End-to-end replication scenarios

pub mod fixtures;
pub mod simulator;

#[cfg(test)]
mod integration;

pub use fixtures::*;
pub use simulator::*;
