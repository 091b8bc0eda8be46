pub mod active;
pub mod buffer;
pub mod config;
pub mod error;
pub mod retry;
pub mod scheduler;

// Re-export commonly used types
pub use active::ActiveSet;
pub use buffer::RecordBuffer;
pub use config::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, MuxConfig, RetryScope, parse_delimiter};
pub use error::{ConfigError, MuxError};
pub use retry::RetryBudget;
pub use scheduler::{MuxStats, ReadOutcome, RoundRobinScheduler, SchedulerState};
