//! beatchain Integrity Engine
//!
//! This crate provides:
//! - SHA-256 record hashing
//! - Record-to-predecessor link validation
//! - Whole-chain verification
//! - Genesis and successor record construction

pub mod integrity;
pub mod builder;

pub use integrity::*;
pub use builder::*;
