//! Construction of genesis and successor records

use beatchain_core::{now_timestamp, Record};

use crate::integrity::{compute_hash, genesis_hash};

/// Create the genesis record stamped with the current time
pub fn genesis_record() -> Record {
    genesis_record_at(now_timestamp())
}

/// Create a genesis record with an explicit timestamp.
///
/// The hash covers the zero-valued record, not the stamped timestamp, so
/// every node shares the same genesis hash.
pub fn genesis_record_at(timestamp: String) -> Record {
    Record {
        index: 0,
        timestamp,
        measurement: 0,
        hash: genesis_hash(),
        prev_hash: String::new(),
    }
}

/// Build the successor of `prev` carrying `measurement`, stamped now
pub fn next_record(prev: &Record, measurement: i64) -> Record {
    next_record_at(prev, measurement, now_timestamp())
}

/// Build the successor of `prev` with an explicit timestamp
pub fn next_record_at(prev: &Record, measurement: i64, timestamp: String) -> Record {
    let index = prev.index.wrapping_add(1);
    let hash = compute_hash(index, &timestamp, measurement, &prev.hash);

    Record {
        index,
        timestamp,
        measurement,
        hash,
        prev_hash: prev.hash.clone(),
    }
}
