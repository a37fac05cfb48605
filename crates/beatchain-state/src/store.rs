//! Chain store - the local copy of the replicated chain

use parking_lot::Mutex;

use beatchain_core::{BeatError, BeatResult, Chain, Record};
use beatchain_crypto::{genesis_record, is_valid, next_record};

/// Result of offering a candidate chain to the store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Candidate was strictly longer and is now the stored chain
    Replaced { previous_len: usize, new_len: usize },
    /// Candidate was equal or shorter and was discarded
    NotLonger {
        current_len: usize,
        candidate_len: usize,
    },
}

impl ReplaceOutcome {
    pub fn is_replaced(&self) -> bool {
        matches!(self, ReplaceOutcome::Replaced { .. })
    }
}

/// Chain store.
///
/// Every operation holds the single lock for its whole duration, so no
/// caller observes a partially mutated chain and no two mutations
/// interleave. The chain is never empty.
#[derive(Debug)]
pub struct ChainStore {
    chain: Mutex<Chain>,
}

impl ChainStore {
    /// Create a store holding a fresh genesis record
    pub fn new() -> Self {
        ChainStore {
            chain: Mutex::new(vec![genesis_record()]),
        }
    }

    /// Create a store from an existing chain
    pub fn from_chain(chain: Chain) -> BeatResult<Self> {
        if chain.is_empty() {
            return Err(BeatError::EmptyChain);
        }
        Ok(ChainStore {
            chain: Mutex::new(chain),
        })
    }

    /// Copy of the current chain
    pub fn snapshot(&self) -> Chain {
        self.chain.lock().clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.chain.lock().len()
    }

    /// Whether the store holds no records; false once constructed
    pub fn is_empty(&self) -> bool {
        self.chain.lock().is_empty()
    }

    /// Copy of the last record
    pub fn last(&self) -> BeatResult<Record> {
        self.chain.lock().last().cloned().ok_or(BeatError::EmptyChain)
    }

    /// Append a record without validation. Returns the new length.
    pub fn append(&self, record: Record) -> usize {
        let mut chain = self.chain.lock();
        chain.push(record);
        chain.len()
    }

    /// Append a record only if it extends the current tail
    pub fn append_validated(&self, record: Record) -> BeatResult<usize> {
        let mut chain = self.chain.lock();
        let tail = chain.last().ok_or(BeatError::EmptyChain)?;
        if !is_valid(&record, tail) {
            tracing::warn!(index = record.index, tail = tail.index, "record rejected");
            return Err(BeatError::RecordRejected {
                index: record.index,
            });
        }
        chain.push(record);
        Ok(chain.len())
    }

    /// Build a record for `measurement` on top of the current tail,
    /// validate it, and append it, all under one lock acquisition.
    pub fn append_measurement(&self, measurement: i64) -> BeatResult<Record> {
        let mut chain = self.chain.lock();

        let record = {
            let tail = chain.last().ok_or(BeatError::EmptyChain)?;
            let record = next_record(tail, measurement);
            if !is_valid(&record, tail) {
                tracing::warn!(index = record.index, "locally built record rejected");
                return Err(BeatError::RecordRejected {
                    index: record.index,
                });
            }
            record
        };

        chain.push(record.clone());
        tracing::debug!(index = record.index, measurement, "record appended");
        Ok(record)
    }

    /// Replace the whole chain iff `candidate` is strictly longer
    pub fn replace_if_longer(&self, candidate: Chain) -> ReplaceOutcome {
        let mut chain = self.chain.lock();
        let current_len = chain.len();
        let candidate_len = candidate.len();

        if candidate_len > current_len {
            *chain = candidate;
            ReplaceOutcome::Replaced {
                previous_len: current_len,
                new_len: candidate_len,
            }
        } else {
            ReplaceOutcome::NotLonger {
                current_len,
                candidate_len,
            }
        }
    }
}

impl Default for ChainStore {
    fn default() -> Self {
        Self::new()
    }
}
