//! Merge pipeline for inbound candidate chains

use std::fmt;

use beatchain_core::{BeatError, Chain};
use beatchain_crypto::verify_chain;

use crate::{ChainStore, ReplaceOutcome};

/// How much checking an inbound chain gets before it may replace ours
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Re-validate every record-to-predecessor link before adoption
    #[default]
    Verified,
    /// Adopt any well-formed chain that is strictly longer
    LengthOnly,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::Verified => write!(f, "verified"),
            MergePolicy::LengthOnly => write!(f, "length-only"),
        }
    }
}

/// What happened to a candidate chain
#[derive(Debug)]
pub enum MergeOutcome {
    /// Candidate replaced the stored chain
    Adopted { previous_len: usize, new_len: usize },
    /// Candidate was not strictly longer; expected steady-state traffic
    NotLonger {
        current_len: usize,
        candidate_len: usize,
    },
    /// Candidate was longer but failed verification
    Rejected(BeatError),
}

impl MergeOutcome {
    pub fn is_adopted(&self) -> bool {
        matches!(self, MergeOutcome::Adopted { .. })
    }
}

/// Offer a candidate chain to the store under `policy`
pub fn merge_candidate(store: &ChainStore, candidate: Chain, policy: MergePolicy) -> MergeOutcome {
    // Cheap pre-check; the store re-checks length under its lock.
    let current_len = store.len();
    if candidate.len() <= current_len {
        return MergeOutcome::NotLonger {
            current_len,
            candidate_len: candidate.len(),
        };
    }

    if policy == MergePolicy::Verified {
        if let Err(err) = verify_chain(&candidate) {
            tracing::warn!(candidate_len = candidate.len(), error = %err, "candidate chain rejected");
            return MergeOutcome::Rejected(err);
        }
    }

    match store.replace_if_longer(candidate) {
        ReplaceOutcome::Replaced {
            previous_len,
            new_len,
        } => {
            tracing::info!(previous_len, new_len, %policy, "adopted longer chain");
            MergeOutcome::Adopted {
                previous_len,
                new_len,
            }
        }
        ReplaceOutcome::NotLonger {
            current_len,
            candidate_len,
        } => MergeOutcome::NotLonger {
            current_len,
            candidate_len,
        },
    }
}
