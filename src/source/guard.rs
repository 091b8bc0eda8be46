use std::io;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;
use tracing::trace;

use super::error::AttemptError;
use super::handle::{Source, SourceId};

/// Scratch size used for record-oriented reads unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Outcome of a single successful attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// `n` bytes were copied into the caller's buffer
    Read(usize),
    /// The source will never produce more bytes
    EndOfStream,
}

/// Outcome of a record-oriented read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRead {
    /// A record ending with the delimiter
    Complete(Bytes),
    /// The unterminated remainder of a source that just reached end-of-stream
    Final(Bytes),
    /// Nothing left; the source is exhausted
    EndOfStream,
}

/// Bounds every read against one source by a deadline
///
/// Each attempt runs on its own Tokio task, reading into a scratch buffer the
/// task owns. The task hands its result back over a oneshot channel. If the
/// deadline fires first the receiver is dropped and the task's eventual result
/// is thrown away when it arrives; the task itself is never aborted.
///
/// Bytes read past a record boundary stay in `pending` and are served before
/// the source is read again, so a timeout in the middle of a record loses
/// nothing already received.
pub struct TimeoutGuard {
    source: Source,
    timeout: Duration,
    chunk_size: usize,
    pending: BytesMut,
}

impl TimeoutGuard {
    /// Guard `source` with a per-attempt deadline of `timeout`
    pub fn new(source: Source, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            chunk_size: DEFAULT_CHUNK_SIZE,
            pending: BytesMut::new(),
        }
    }

    /// Set the scratch size used by [`TimeoutGuard::read_record`]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn id(&self) -> SourceId {
        self.source.id()
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make one deadline-bounded read into `buf`
    ///
    /// Bytes already received but not yet handed out are returned first
    /// without touching the source. An empty `buf` returns `Read(0)`.
    pub async fn attempt_read(&mut self, buf: &mut [u8]) -> Result<Attempt, AttemptError> {
        if buf.is_empty() {
            return Ok(Attempt::Read(0));
        }

        if !self.pending.is_empty() {
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending.split_to(n));
            return Ok(Attempt::Read(n));
        }

        if self.source.is_exhausted() {
            return Ok(Attempt::EndOfStream);
        }

        match self.race(buf.len()).await? {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(Attempt::Read(chunk.len()))
            }
            None => {
                self.source.mark_exhausted();
                Ok(Attempt::EndOfStream)
            }
        }
    }

    /// Standalone timed read: `Ok(0)` means end-of-stream for a non-empty `buf`
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, AttemptError> {
        match self.attempt_read(buf).await? {
            Attempt::Read(n) => Ok(n),
            Attempt::EndOfStream => Ok(0),
        }
    }

    /// Read until `delimiter` or end-of-stream
    ///
    /// May issue several attempts; each one is bounded separately. On a
    /// timeout the bytes gathered so far are kept for the next call.
    pub async fn read_record(&mut self, delimiter: u8) -> Result<RecordRead, AttemptError> {
        let mut scanned = 0;
        loop {
            if let Some(pos) = self.pending[scanned..].iter().position(|&b| b == delimiter) {
                let record = self.pending.split_to(scanned + pos + 1).freeze();
                return Ok(RecordRead::Complete(record));
            }
            scanned = self.pending.len();

            if self.source.is_exhausted() {
                return Ok(self.take_final());
            }

            match self.race(self.chunk_size).await? {
                Some(chunk) => self.pending.extend_from_slice(&chunk),
                None => {
                    self.source.mark_exhausted();
                    return Ok(self.take_final());
                }
            }
        }
    }

    fn take_final(&mut self) -> RecordRead {
        if self.pending.is_empty() {
            RecordRead::EndOfStream
        } else {
            RecordRead::Final(self.pending.split().freeze())
        }
    }

    /// Race one background read of up to `len` bytes against the deadline
    ///
    /// `Ok(None)` is end-of-stream.
    async fn race(&self, len: usize) -> Result<Option<Vec<u8>>, AttemptError> {
        let source_id = self.source.id();
        let stream = self.source.stream();
        let (tx, rx) = oneshot::channel();

        trace!(%source_id, len, "Starting read attempt");
        tokio::spawn(async move {
            let mut scratch = vec![0u8; len];
            let result = {
                let mut reader = stream.lock().await;
                reader.read(&mut scratch).await
            };
            let result = result.map(|n| {
                scratch.truncate(n);
                scratch
            });
            // Fails only if the deadline already won; the result is dropped.
            let _ = tx.send(result);
        });

        match tokio::time::timeout(self.timeout, rx).await {
            Err(_elapsed) => Err(AttemptError::Timeout {
                source_id,
                after: self.timeout,
            }),
            Ok(Err(_closed)) => Err(AttemptError::Read {
                source_id,
                error: io::Error::other("read attempt ended without a result"),
            }),
            Ok(Ok(Ok(chunk))) if chunk.is_empty() => Ok(None),
            Ok(Ok(Ok(chunk))) => Ok(Some(chunk)),
            Ok(Ok(Err(error))) => Err(AttemptError::Read { source_id, error }),
        }
    }
}
