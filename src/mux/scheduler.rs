use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use futures::stream;
use tokio::io::AsyncRead;
use tracing::{debug, error, info, warn};

use super::active::ActiveSet;
use super::buffer::RecordBuffer;
use super::config::MuxConfig;
use super::error::{ConfigError, MuxError};
use super::retry::RetryBudget;
use crate::source::{AttemptError, RecordRead, Source, SourceId, TimeoutGuard};

/// Result of a successful [`RoundRobinScheduler::read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were written to the caller's buffer
    Data(usize),
    /// Every source is exhausted and nothing is buffered
    EndOfStream,
}

/// Where the scheduler is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// A record (or what is left of it) is buffered, or nothing was read yet
    Draining,
    /// A fill was started and has not completed
    Filling,
    /// Terminal: all sources reported end-of-stream
    Exhausted,
    /// Terminal: retries exceeded or a source failed
    Failed,
}

/// Running counters, for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MuxStats {
    pub records: u64,
    pub bytes: u64,
    pub timeouts: u64,
    pub sources_exhausted: usize,
}

/// Merges records from several sources, one record per source per turn
///
/// Sources are visited in their original order. A source that reaches
/// end-of-stream leaves the rotation for good; a source that misses its
/// deadline loses its turn and the timeout counts against the retry budget.
/// A source error or a spent retry budget fails the whole stream.
///
/// Not meant for concurrent callers: every operation takes `&mut self`.
///
/// # Example
/// ```rust,ignore
/// let mut mux = RoundRobinScheduler::new([&b"0\n"[..], &b"1\n"[..]], MuxConfig::default())?;
/// let mut buf = [0u8; 64];
/// while let ReadOutcome::Data(n) = mux.read(&mut buf).await? {
///     stdout.write_all(&buf[..n]).await?;
/// }
/// ```
pub struct RoundRobinScheduler {
    sources: ActiveSet<TimeoutGuard>,
    buffer: RecordBuffer,
    retries: RetryBudget,
    config: MuxConfig,
    state: SchedulerState,
    failure: Option<MuxError>,
    stats: MuxStats,
}

impl RoundRobinScheduler {
    /// Create a scheduler over `readers`, numbered by position
    pub fn new<I>(readers: I, config: MuxConfig) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: AsyncRead + Send + Unpin + 'static,
    {
        config.validate()?;

        let guards: Vec<_> = readers
            .into_iter()
            .enumerate()
            .map(|(index, reader)| {
                TimeoutGuard::new(
                    Source::new(SourceId::new(index), reader),
                    config.per_source_timeout,
                )
                .with_chunk_size(config.read_chunk_size)
            })
            .collect();

        let retries = RetryBudget::new(config.retry_scope, config.max_retries, guards.len());
        debug!(
            sources = guards.len(),
            timeout = ?config.per_source_timeout,
            max_retries = retries.max_retries(),
            retry_scope = %retries.scope(),
            "Created round-robin scheduler"
        );

        Ok(Self {
            sources: ActiveSet::new(guards),
            buffer: RecordBuffer::new(),
            retries,
            config,
            state: SchedulerState::Draining,
            failure: None,
            stats: MuxStats::default(),
        })
    }

    /// Copy merged bytes into `buf`
    ///
    /// Returns `Data(n)` with `n > 0` until every source is exhausted, then
    /// `EndOfStream`. An empty `buf` always returns `Data(0)` and changes
    /// nothing. Once the scheduler has finished or failed, every call returns
    /// that same outcome again.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, MuxError> {
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        if !self.ensure_buffered().await? {
            return Ok(ReadOutcome::EndOfStream);
        }

        let n = self.buffer.drain_into(buf);
        self.stats.bytes += n as u64;
        Ok(ReadOutcome::Data(n))
    }

    /// Next whole record, or `None` once every source is exhausted
    ///
    /// If an earlier [`read`](Self::read) left part of a record buffered,
    /// that remainder is returned first.
    pub async fn next_record(&mut self) -> Result<Option<Bytes>, MuxError> {
        if !self.ensure_buffered().await? {
            return Ok(None);
        }

        let record = self.buffer.take();
        self.stats.bytes += record.len() as u64;
        Ok(Some(record))
    }

    /// Turn the scheduler into a stream of records
    ///
    /// The stream ends after end-of-stream, or right after yielding the
    /// first error.
    pub fn into_records(self) -> impl Stream<Item = Result<Bytes, MuxError>> + Send {
        stream::unfold(Some(self), |state| async move {
            let mut mux = state?;
            match mux.next_record().await {
                Ok(Some(record)) => Some((Ok(record), Some(mux))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &MuxConfig {
        &self.config
    }

    pub fn stats(&self) -> MuxStats {
        self.stats
    }

    /// Number of sources still in rotation
    pub fn active_sources(&self) -> usize {
        self.sources.len()
    }

    /// Ids of the sources still in rotation, in visiting order
    pub fn active_ids(&self) -> Vec<SourceId> {
        self.sources
            .live_slots()
            .iter()
            .map(|&slot| SourceId::new(slot))
            .collect()
    }

    /// Index into the active sources of the next one to be read
    pub fn cursor(&self) -> usize {
        self.sources.cursor()
    }

    pub fn consecutive_retries(&self) -> usize {
        self.retries.consecutive()
    }

    /// Make sure a record is buffered; false once everything is exhausted
    async fn ensure_buffered(&mut self) -> Result<bool, MuxError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        if self.state == SchedulerState::Exhausted {
            return Ok(false);
        }

        self.state = SchedulerState::Filling;
        match self.fill().await {
            Ok(true) => {
                self.state = SchedulerState::Draining;
                Ok(true)
            }
            Ok(false) => {
                info!(
                    records = self.stats.records,
                    timeouts = self.stats.timeouts,
                    "All sources exhausted"
                );
                self.state = SchedulerState::Exhausted;
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "Multiplexer failed");
                self.state = SchedulerState::Failed;
                self.failure = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Pull one record into the empty buffer
    ///
    /// Returns false when no sources are left.
    async fn fill(&mut self) -> Result<bool, MuxError> {
        debug_assert!(self.buffer.is_empty());

        loop {
            let cursor = self.sources.cursor();
            let Some((slot, guard)) = self.sources.current_mut() else {
                return Ok(false);
            };
            let source_id = guard.id();
            let timeout = guard.timeout();

            match guard.read_record(self.config.delimiter).await {
                Ok(RecordRead::Complete(record)) => {
                    self.accept(slot, &record);
                    self.sources.advance();
                    debug!(%source_id, cursor, len = record.len(), "Filled record");
                    return Ok(true);
                }
                Ok(RecordRead::Final(record)) => {
                    // Last bytes of the source: emit them and drop it in one step.
                    self.accept(slot, &record);
                    self.remove_current(source_id);
                    debug!(%source_id, cursor, len = record.len(), "Filled final record");
                    return Ok(true);
                }
                Ok(RecordRead::EndOfStream) => {
                    self.remove_current(source_id);
                }
                Err(AttemptError::Timeout { .. }) => {
                    self.stats.timeouts += 1;
                    self.sources.advance();
                    let spent = self.retries.record_timeout(slot);
                    warn!(
                        %source_id,
                        ?timeout,
                        retries = self.retries.consecutive(),
                        max_retries = self.retries.max_retries(),
                        "Read timed out, switching to next source"
                    );
                    if spent {
                        return Err(MuxError::RetriesExceeded {
                            max_retries: self.retries.max_retries(),
                            source_id,
                        });
                    }
                }
                Err(AttemptError::Read { error, .. }) => {
                    return Err(MuxError::Source {
                        source_id,
                        error: Arc::new(error),
                    });
                }
            }
        }
    }

    fn accept(&mut self, slot: usize, record: &[u8]) {
        self.buffer.push(record);
        self.retries.record_success(slot);
        self.stats.records += 1;
    }

    fn remove_current(&mut self, source_id: SourceId) {
        if let Some((slot, _guard)) = self.sources.remove_current() {
            self.retries.forget(slot);
            self.stats.sources_exhausted += 1;
            debug!(
                %source_id,
                remaining = self.sources.len(),
                total = self.sources.capacity(),
                "Removed exhausted source"
            );
        }
    }
}
