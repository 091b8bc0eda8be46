use std::io;
use std::time::Duration;
use thiserror::Error;

use super::handle::SourceId;

/// Errors produced by a single guarded read attempt
#[derive(Error, Debug)]
pub enum AttemptError {
    /// The attempt did not finish before the deadline. Retryable.
    #[error("read from source {source_id} timed out after {after:?}")]
    Timeout { source_id: SourceId, after: Duration },

    /// The source itself reported a failure. Not retryable.
    #[error("read from source {source_id} failed: {error}")]
    Read {
        source_id: SourceId,
        #[source]
        error: io::Error,
    },
}

impl AttemptError {
    /// True for errors the scheduler may recover from by moving on
    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::Timeout { .. })
    }

    /// Id of the source the attempt was made against
    pub fn source_id(&self) -> SourceId {
        match self {
            AttemptError::Timeout { source_id, .. } | AttemptError::Read { source_id, .. } => {
                *source_id
            }
        }
    }
}
