pub mod error;
pub mod files;
pub mod pipe;
pub mod simulated;

// Re-export commonly used types
pub use error::IoError;
pub use files::{from_futures, open_sources};
pub use pipe::copy_records;
pub use simulated::{DelayedReader, demo_sources};
