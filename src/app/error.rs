use std::io;
use thiserror::Error;

use crate::io::IoError;
use crate::mux::{ConfigError, MuxError};

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Input/output error: {0}")]
    Stream(#[from] IoError),

    #[error("Multiplexer error: {0}")]
    Mux(#[from] MuxError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}
