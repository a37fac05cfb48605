//! beatchain Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every beatchain crate:
//! - Records and chains
//! - Timestamp source
//! - Error types

pub mod record;
pub mod time;
pub mod error;

pub use record::*;
pub use time::*;
pub use error::*;
