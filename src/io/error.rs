use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::mux::MuxError;

/// Errors at the edges of the multiplexer: opening inputs, writing output
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Multiplexer error: {0}")]
    Mux(#[from] MuxError),
}
