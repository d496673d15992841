//! Event scanner over the node's output stream

pub mod matchers;

use std::collections::VecDeque;
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::constants::staking::MAX_BUFFERED_BYTES;
use crate::errors::{StakerError, StakerResult};
use crate::models::event::LogEvent;

pub use self::matchers::classify;

/// Size of a single read from the underlying stream
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Splits arbitrary byte chunks into complete lines.
///
/// A trailing partial line is held back and prefixed to the next chunk, so
/// matchers never see a line cut at a chunk boundary. The held-back data is
/// bounded; a partial line outgrowing the bound is dropped up to its newline.
pub struct LineSplitter {
    pending: Vec<u8>,
    max_pending: usize,
    discarding: bool,
}

impl LineSplitter {
    pub fn new(max_pending: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending,
            discarding: false,
        }
    }

    /// Feed a chunk and collect the lines it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(newline) = rest.iter().position(|&b| b == b'\n') {
            if self.discarding {
                self.discarding = false;
            } else {
                self.pending.extend_from_slice(&rest[..newline]);
                lines.push(self.take_line());
            }
            rest = &rest[newline + 1..];
        }

        if !rest.is_empty() && !self.discarding {
            if self.pending.len() + rest.len() > self.max_pending {
                warn!(
                    "Dropping unterminated line longer than {} bytes",
                    self.max_pending
                );
                self.pending.clear();
                self.discarding = true;
            } else {
                self.pending.extend_from_slice(rest);
            }
        }

        lines
    }

    /// Flush the final unterminated line at end of stream
    pub fn finish(&mut self) -> Option<String> {
        if self.discarding || self.pending.is_empty() {
            self.pending.clear();
            self.discarding = false;
            return None;
        }
        Some(self.take_line())
    }

    /// Bytes currently held back
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.pending)
            .trim_end_matches('\r')
            .to_string();
        self.pending.clear();
        line
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(MAX_BUFFERED_BYTES)
    }
}

/// Lazily turns an unbounded byte stream into `LogEvent`s.
///
/// Noise lines are logged at debug level and skipped. The scanner is
/// consumed as it goes and cannot be restarted.
pub struct LogEventScanner<R> {
    reader: R,
    splitter: LineSplitter,
    ready: VecDeque<String>,
    buf: Vec<u8>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LogEventScanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_splitter(reader, LineSplitter::default())
    }

    pub fn with_splitter(reader: R, splitter: LineSplitter) -> Self {
        Self {
            reader,
            splitter,
            ready: VecDeque::new(),
            buf: vec![0u8; READ_CHUNK_SIZE],
            eof: false,
        }
    }

    /// Next job-finished or queue event; `None` once the stream has ended
    pub async fn next_event(&mut self) -> StakerResult<Option<LogEvent>> {
        loop {
            while let Some(line) = self.ready.pop_front() {
                match classify(&line) {
                    LogEvent::Noise => debug!("node: {}", line),
                    event => return Ok(Some(event)),
                }
            }

            if self.eof {
                return Ok(None);
            }

            let read = self
                .reader
                .read(&mut self.buf)
                .await
                .map_err(|e| StakerError::StreamIo(e.to_string()))?;

            if read == 0 {
                self.eof = true;
                if let Some(line) = self.splitter.finish() {
                    self.ready.push_back(line);
                }
            } else {
                let lines = self.splitter.push(&self.buf[..read]);
                self.ready.extend(lines);
            }
        }
    }
}
