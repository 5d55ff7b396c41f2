//! Line-level event stream decoding.
//!
//! - one event per line, data lines start with `data: `
//! - a `[DONE]` payload ends the stream; later lines are never looked at
//! - payloads that are not JSON are reported as [`Frame::Malformed`] and
//!   skipped by the caller

use serde_json::Value;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SIGNAL: &str = "[DONE]";

/// Classification of one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A data line carrying a JSON chunk.
    Chunk(Value),
    /// The end-of-stream sentinel.
    Done,
    /// A data line whose payload is not valid JSON; carries the parser error.
    Malformed(String),
    /// Blank lines, comments, `event:` lines and anything else without the prefix.
    Ignored,
}

/// Decode a single line.
pub fn decode_line(line: &str) -> Frame {
    let Some(payload) = line.trim().strip_prefix(DATA_PREFIX) else {
        return Frame::Ignored;
    };
    let payload = payload.trim();
    if payload == DONE_SIGNAL {
        return Frame::Done;
    }
    match serde_json::from_str::<Value>(payload) {
        Ok(v) => Frame::Chunk(v),
        Err(e) => Frame::Malformed(e.to_string()),
    }
}

/// Reassembles lines from arbitrarily split byte chunks.
///
/// Bytes are buffered until a `\n` arrives, so a UTF-8 sequence or a data
/// line split across network reads is decoded whole.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and return every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=idx).collect();
            lines.push(String::from_utf8_lossy(&line[..idx]).into_owned());
        }
        lines
    }

    /// Whatever is left after the input ends, if anything.
    pub fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.buf).into_owned())
        }
    }
}
