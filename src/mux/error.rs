use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::source::SourceId;

/// Terminal failures of the multiplexer
///
/// Cloneable so the same failure can be reported again on every read after
/// the scheduler has failed. Equality compares source errors by
/// [`io::ErrorKind`], since `io::Error` itself is not comparable.
#[derive(Error, Debug, Clone)]
pub enum MuxError {
    #[error("max retries ({max_retries}) exceeded, last timeout on source {source_id}")]
    RetriesExceeded {
        max_retries: usize,
        source_id: SourceId,
    },

    #[error("source {source_id} failed: {error}")]
    Source {
        source_id: SourceId,
        #[source]
        error: Arc<io::Error>,
    },
}

impl MuxError {
    /// Id of the source that triggered the failure
    pub fn source_id(&self) -> SourceId {
        match self {
            MuxError::RetriesExceeded { source_id, .. } | MuxError::Source { source_id, .. } => {
                *source_id
            }
        }
    }
}

impl PartialEq for MuxError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                MuxError::RetriesExceeded {
                    max_retries: a,
                    source_id: x,
                },
                MuxError::RetriesExceeded {
                    max_retries: b,
                    source_id: y,
                },
            ) => a == b && x == y,
            (
                MuxError::Source {
                    source_id: x,
                    error: a,
                },
                MuxError::Source {
                    source_id: y,
                    error: b,
                },
            ) => x == y && a.kind() == b.kind(),
            _ => false,
        }
    }
}

impl Eq for MuxError {}

/// Invalid or unreadable multiplexer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_retries must be at least 1")]
    ZeroRetries,

    #[error("per-source timeout must be greater than zero")]
    ZeroTimeout,

    #[error("read chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    #[error("Invalid retry scope: {0}")]
    InvalidRetryScope(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
