//! Timestamp source for new records
//!
//! Timestamps are opaque strings: they feed the record hash and are never
//! compared or parsed back.

use chrono::{SecondsFormat, Utc};

/// Current wall-clock time as an RFC 3339 UTC string
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}
