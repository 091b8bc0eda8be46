pub mod error;
pub mod guard;
pub mod handle;

// Re-export commonly used types
pub use error::AttemptError;
pub use guard::{Attempt, RecordRead, TimeoutGuard};
pub use handle::{BoxedReader, Source, SourceId, SourceState};
