//! Inbound line framing
//!
//! Lines are split on raw bytes and converted to text afterwards. A line
//! that is too long or not UTF-8 is yielded as a per-line error and the
//! stream carries on; only I/O failures end it.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder};

use beatchain_core::{BeatError, BeatResult};
use beatchain_wire::MAX_LINE_LENGTH;

/// Newline decoder yielding one `BeatResult<String>` per line
#[derive(Debug)]
pub struct LineDecoder {
    inner: AnyDelimiterCodec,
    max_length: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    /// Decoder that rejects lines longer than `max_length` bytes
    pub fn with_max_length(max_length: usize) -> Self {
        LineDecoder {
            inner: AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_length),
            max_length,
        }
    }

    fn frame(
        &self,
        chunk: Result<Option<Bytes>, AnyDelimiterCodecError>,
    ) -> io::Result<Option<BeatResult<String>>> {
        match chunk {
            Ok(Some(bytes)) => Ok(Some(to_line(&bytes))),
            Ok(None) => Ok(None),
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                Ok(Some(Err(BeatError::MessageTooLong {
                    limit: self.max_length,
                })))
            }
            Err(AnyDelimiterCodecError::Io(e)) => Err(e),
        }
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineDecoder {
    type Item = BeatResult<String>;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        let chunk = self.inner.decode(buf);
        self.frame(chunk)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        let chunk = self.inner.decode_eof(buf);
        self.frame(chunk)
    }
}

fn to_line(bytes: &[u8]) -> BeatResult<String> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| BeatError::InvalidWireFormat(format!("line is not valid UTF-8: {}", e)))
}
