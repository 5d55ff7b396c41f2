//! Streaming response processing.
//!
//! A streamed chat response is newline-delimited text in the event-stream
//! style. This module turns it back into one [`NormalizedResult`]:
//!
//! ```text
//! bytes ──► LineBuffer ──► decode_line ──► StreamAccumulator ──► NormalizedResult
//!              │               │                 │
//!         split reads     data:/[DONE]     append / replace,
//!         rejoined        malformed skip   last-writer metadata
//! ```
//!
//! | Entry point | Input |
//! |-------------|-------|
//! | [`parse_stream`] | a complete transcript already held in memory |
//! | [`StreamParser`] | byte chunks pushed one at a time |
//! | [`parse_byte_stream`] | a transport byte stream |
//!
//! Parsing never fails on content: malformed chunks are skipped and an input
//! with no data lines yields an empty result. Only transport errors from
//! [`parse_byte_stream`] propagate.

pub mod accumulate;
pub mod decode;

pub use accumulate::StreamAccumulator;
pub use decode::{decode_line, Frame, LineBuffer, DATA_PREFIX, DONE_SIGNAL};

use crate::types::NormalizedResult;
use crate::{BoxStream, Result};
use bytes::Bytes;
use futures::StreamExt;

/// Parse a complete streamed transcript.
///
/// ```
/// use courier_gateway::pipeline::parse_stream;
///
/// let raw = "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\
///            data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n\
///            data: [DONE]\n";
/// assert_eq!(parse_stream(raw).text(), "AB");
/// ```
pub fn parse_stream(raw: &str) -> NormalizedResult {
    let mut parser = StreamParser::new();
    for line in raw.split('\n') {
        if !parser.feed_line(line) {
            break;
        }
    }
    parser.finish()
}

/// Incremental parser for byte chunks as they arrive.
#[derive(Debug, Default)]
pub struct StreamParser {
    lines: LineBuffer,
    acc: StreamAccumulator,
    done: bool,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes. Returns `false` once the end-of-stream sentinel has
    /// been seen; anything fed after that is ignored.
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        if self.done {
            return false;
        }
        for line in self.lines.push(bytes) {
            if !self.feed_line(&line) {
                break;
            }
        }
        !self.done
    }

    fn feed_line(&mut self, line: &str) -> bool {
        if self.done {
            return false;
        }
        match decode_line(line) {
            Frame::Chunk(chunk) => self.acc.apply(&chunk),
            Frame::Done => self.done = true,
            Frame::Malformed(reason) => {
                tracing::debug!(%reason, "skipping malformed stream chunk");
                self.acc.skip();
            }
            Frame::Ignored => {}
        }
        !self.done
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn accumulator(&self) -> &StreamAccumulator {
        &self.acc
    }

    /// Flush any unterminated last line and build the result.
    pub fn finish(mut self) -> NormalizedResult {
        if !self.done {
            if let Some(tail) = std::mem::take(&mut self.lines).finish() {
                self.feed_line(&tail);
            }
        }
        tracing::debug!(
            chunks = self.acc.chunks(),
            skipped = self.acc.skipped(),
            done = self.done,
            "stream parsed"
        );
        self.acc.finish()
    }
}

/// Drive a transport byte stream to completion.
///
/// Reading stops as soon as `[DONE]` is seen; the rest of the stream is
/// dropped unread.
pub async fn parse_byte_stream(mut stream: BoxStream<'_, Bytes>) -> Result<NormalizedResult> {
    let mut parser = StreamParser::new();
    while let Some(chunk) = stream.next().await {
        if !parser.feed(&chunk?) {
            break;
        }
    }
    Ok(parser.finish())
}
