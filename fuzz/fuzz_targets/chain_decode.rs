#![no_main]

use libfuzzer_sys::fuzz_target;

use beatchain_crypto::verify_chain;
use beatchain_state::{merge_candidate, ChainStore, MergePolicy};
use beatchain_wire::{decode_chain, encode_chain};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(chain) = decode_chain(line) else {
        return;
    };

    // Anything that decodes must re-encode to the same records
    let encoded = encode_chain(&chain).expect("re-encode");
    assert_eq!(decode_chain(&encoded).expect("re-decode"), chain);

    // A verified merge never leaves an unverifiable chain in the store
    let store = ChainStore::new();
    let _ = merge_candidate(&store, chain, MergePolicy::Verified);
    assert!(verify_chain(&store.snapshot()).is_ok());
});
