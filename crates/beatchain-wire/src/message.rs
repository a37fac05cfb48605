//! Chain message encoding

use beatchain_core::{BeatError, BeatResult, Chain, Record};

/// Maximum accepted length of one inbound message line
pub const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// Encode a chain as a single line (without the trailing newline)
pub fn encode_chain(chain: &[Record]) -> BeatResult<String> {
    serde_json::to_string(chain).map_err(|e| BeatError::InvalidWireFormat(e.to_string()))
}

/// Encode a chain as indented text for display
pub fn encode_chain_pretty(chain: &[Record]) -> BeatResult<String> {
    serde_json::to_string_pretty(chain).map_err(|e| BeatError::InvalidWireFormat(e.to_string()))
}

/// Decode one message line into a candidate chain
pub fn decode_chain(line: &str) -> BeatResult<Chain> {
    let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    if line.len() > MAX_LINE_LENGTH {
        return Err(BeatError::MessageTooLong {
            limit: MAX_LINE_LENGTH,
        });
    }

    serde_json::from_str(line).map_err(|e| BeatError::InvalidWireFormat(e.to_string()))
}
