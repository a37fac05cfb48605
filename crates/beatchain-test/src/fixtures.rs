//! Chain fixtures

use rand::Rng;

use beatchain_core::Chain;
use beatchain_crypto::{genesis_record_at, next_record_at};

/// Build a valid chain of `len` records (including genesis) with the given measurements cycled
pub fn chain_with(len: usize, measurements: &[i64]) -> Chain {
    let mut chain = Vec::with_capacity(len.max(1));
    chain.push(genesis_record_at("1970-01-01T00:00:00Z".into()));

    for i in 1..len {
        let measurement = if measurements.is_empty() {
            0
        } else {
            measurements[(i - 1) % measurements.len()]
        };
        let prev = &chain[i - 1];
        let record = next_record_at(prev, measurement, format!("fixture-{}", i));
        chain.push(record);
    }
    chain
}

/// Valid chain of `len` records with resting heart-rate samples
pub fn valid_chain(len: usize) -> Chain {
    chain_with(len, &[62, 64, 71, 68, 75])
}

/// Valid chain of `len` records with random measurements
pub fn random_chain<R: Rng>(len: usize, rng: &mut R) -> Chain {
    let measurements: Vec<i64> = (1..len.max(2)).map(|_| rng.gen_range(40..200)).collect();
    chain_with(len, &measurements)
}

/// Valid chain with the measurement of record `at` altered after hashing
pub fn forged_chain(len: usize, at: usize) -> Chain {
    let mut chain = valid_chain(len);
    if let Some(record) = chain.get_mut(at) {
        record.measurement = record.measurement.wrapping_add(1000);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatchain_crypto::verify_chain;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_valid_chain_verifies() {
        for len in 1..10 {
            let chain = valid_chain(len);
            assert_eq!(chain.len(), len);
            assert!(verify_chain(&chain).is_ok());
        }
    }

    #[test]
    fn test_zero_length_still_has_genesis() {
        assert_eq!(valid_chain(0).len(), 1);
    }

    #[test]
    fn test_random_chain_verifies() {
        let mut rng = StdRng::seed_from_u64(7);
        let chain = random_chain(20, &mut rng);
        assert_eq!(chain.len(), 20);
        assert!(verify_chain(&chain).is_ok());
    }

    #[test]
    fn test_forged_chain_fails() {
        assert!(verify_chain(&forged_chain(5, 3)).is_err());
    }

    mod prop {
        use super::*;
        use beatchain_wire::{decode_chain, encode_chain};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_wire_roundtrip_preserves_chain(
                measurements in proptest::collection::vec(any::<i64>(), 0..24),
            ) {
                let chain = chain_with(measurements.len() + 1, &measurements);
                let decoded = decode_chain(&encode_chain(&chain).unwrap()).unwrap();
                prop_assert_eq!(&decoded, &chain);
                prop_assert!(verify_chain(&decoded).is_ok());
            }
        }
    }
}
