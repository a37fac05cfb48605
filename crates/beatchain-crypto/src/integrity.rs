//! Record hashing and link validation

use sha2::{Digest, Sha256};

use beatchain_core::{BeatError, BeatResult, Record};

/// Hash of the zero-valued genesis record (index 0, no timestamp, measurement 0, no predecessor)
pub fn genesis_hash() -> String {
    compute_hash(0, "", 0, "")
}

/// Compute the content hash binding a record to its predecessor.
///
/// The four fields are concatenated in fixed order (decimal `index`,
/// `timestamp`, decimal `measurement`, `prev_hash`) and digested with
/// SHA-256. The result is lowercase hex.
pub fn compute_hash(index: u64, timestamp: &str, measurement: i64, prev_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(index.to_string().as_bytes());
    hasher.update(timestamp.as_bytes());
    hasher.update(measurement.to_string().as_bytes());
    hasher.update(prev_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute a record's hash from its own fields
pub fn hash_record(record: &Record) -> String {
    compute_hash(
        record.index,
        &record.timestamp,
        record.measurement,
        &record.prev_hash,
    )
}

/// Check that `candidate` correctly extends `predecessor`
pub fn is_valid(candidate: &Record, predecessor: &Record) -> bool {
    if predecessor.index.checked_add(1) != Some(candidate.index) {
        return false;
    }

    if predecessor.hash != candidate.prev_hash {
        return false;
    }

    hash_record(candidate) == candidate.hash
}

/// Check that a record is a genesis record.
///
/// The genesis hash covers only zero-valued fields, so the measurement is
/// checked directly. The timestamp is not covered.
pub fn is_genesis(record: &Record) -> bool {
    record.is_genesis_shaped() && record.measurement == 0 && record.hash == genesis_hash()
}

/// Verify every link of a candidate chain.
///
/// Reports the first offending record.
pub fn verify_chain(chain: &[Record]) -> BeatResult<()> {
    let genesis = chain.first().ok_or(BeatError::EmptyChain)?;
    if !is_genesis(genesis) {
        return Err(BeatError::InvalidGenesis);
    }

    for pair in chain.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if is_valid(next, prev) {
            continue;
        }

        let err = if prev.index.checked_add(1) != Some(next.index) {
            BeatError::InvalidIndex {
                expected: prev.index.saturating_add(1),
                got: next.index,
            }
        } else if prev.hash != next.prev_hash {
            BeatError::InvalidPrevHash {
                index: next.index,
                expected: prev.hash.clone(),
                got: next.prev_hash.clone(),
            }
        } else {
            BeatError::HashMismatch { index: next.index }
        };
        tracing::debug!(error = %err, "chain verification failed");
        return Err(err);
    }

    Ok(())
}
