//! Chain records
//!
//! A record binds one operator measurement to its predecessor through a
//! content hash. The hash itself is computed by `beatchain-crypto`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered sequence of records; position 0 is genesis
pub type Chain = Vec<Record>;

/// A single chain entry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Position in the chain, 0 for genesis
    pub index: u64,
    /// Creation time (hashed, never compared)
    pub timestamp: String,
    /// Operator-supplied sample
    pub measurement: i64,
    /// Hex digest over (index, timestamp, measurement, prev_hash)
    pub hash: String,
    /// Hash of the preceding record, empty for genesis
    pub prev_hash: String,
}

impl Record {
    #[inline]
    pub fn is_genesis_shaped(&self) -> bool {
        self.index == 0 && self.prev_hash.is_empty()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("index", &self.index)
            .field("measurement", &self.measurement)
            .field("hash", &short_hash(&self.hash))
            .field("prev_hash", &short_hash(&self.prev_hash))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({})",
            self.index,
            self.measurement,
            short_hash(&self.hash)
        )
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            index: 3,
            timestamp: "2024-01-01T00:00:00Z".into(),
            measurement: 72,
            hash: "ab".repeat(32),
            prev_hash: "cd".repeat(32),
        }
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();

        for key in ["index", "timestamp", "measurement", "hash", "prevHash"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 5);
    }

    #[test]
    fn test_genesis_shape() {
        let mut record = sample();
        assert!(!record.is_genesis_shaped());

        record.index = 0;
        record.prev_hash.clear();
        assert!(record.is_genesis_shaped());
    }

    #[test]
    fn test_display_truncates_hash() {
        let shown = sample().to_string();
        assert_eq!(shown, "#3 72 (abababababab)");
    }
}
