use std::fmt;
use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::sync::Mutex;

/// Type alias for a boxed, type-erased byte producer
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Ordinal position of a source in the list it was created from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(usize);

impl SourceId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a source; `Exhausted` is final
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Active,
    Exhausted,
}

/// One caller-supplied byte producer
///
/// The reader sits behind an `Arc<Mutex<_>>` so a read attempt running on a
/// background task can outlive the caller that started it. Attempts against
/// the same source are serialized by the mutex, never interleaved.
pub struct Source {
    id: SourceId,
    stream: Arc<Mutex<BoxedReader>>,
    state: SourceState,
}

impl Source {
    /// Wrap a reader as the source at position `id`
    pub fn new<R>(id: SourceId, reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            id,
            stream: Arc::new(Mutex::new(Box::new(reader))),
            state: SourceState::Active,
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == SourceState::Exhausted
    }

    /// Mark the source as having reported end-of-stream
    pub(crate) fn mark_exhausted(&mut self) {
        self.state = SourceState::Exhausted;
    }

    /// Shared handle to the underlying reader, for a background attempt
    pub(crate) fn stream(&self) -> Arc<Mutex<BoxedReader>> {
        Arc::clone(&self.stream)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
