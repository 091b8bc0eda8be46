//! Prelude module for convenient imports
//!
//! Import everything you need with: `use rrmux::prelude::*;`

// Source types
pub use crate::source::{
    Attempt, AttemptError, BoxedReader, RecordRead, Source, SourceId, SourceState, TimeoutGuard,
};

// Multiplexer types
pub use crate::mux::{
    ConfigError, MuxConfig, MuxError, MuxStats, ReadOutcome, RetryScope, RoundRobinScheduler,
    SchedulerState,
};

// IO types
pub use crate::io::{DelayedReader, IoError, copy_records, demo_sources, from_futures, open_sources};

// App types
pub use crate::app::{AppError, Args, CliApp, init_tracing};
