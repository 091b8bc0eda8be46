use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::error::AppError;
use crate::mux::{MuxConfig, RetryScope, parse_delimiter};

/// Merge record-oriented inputs round-robin, tolerating slow sources
///
/// Records (lines by default) are taken one per input per turn, in the order
/// the inputs are given. An input that stalls past the timeout loses its turn;
/// too many timeouts in a row abort the run.
///
/// Example usage:
///   rrmux a.log b.log c.log
///   rrmux --timeout-ms 250 --max-retries 5 a.log b.log
///   rrmux --delimiter '0x1e' records/*.bin
///   rrmux --simulate 100
#[derive(Parser, Debug)]
#[command(name = "rrmux", version)]
pub struct Args {
    /// Input files, visited in the order given
    #[arg(required_unless_present = "simulate")]
    pub files: Vec<PathBuf>,

    /// Deadline for a single read attempt, in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Consecutive timeouts tolerated before giving up
    #[arg(short = 'r', long, value_name = "N")]
    pub max_retries: Option<usize>,

    /// Record delimiter: a character, \n, \t, \r, \0 or a hex byte like 0x1e
    #[arg(short = 'd', long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// How timeouts are counted: global or per-source
    #[arg(long, value_name = "SCOPE")]
    pub retry_scope: Option<RetryScope>,

    /// Bytes requested from a source per read attempt
    #[arg(long, value_name = "BYTES")]
    pub read_chunk_size: Option<usize>,

    /// TOML config file; flags given on the command line take precedence
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Ignore FILES and merge N fast plus N flaky in-memory sources
    #[arg(long, value_name = "N", conflicts_with = "files")]
    pub simulate: Option<usize>,

    /// Stall applied by flaky sources in simulate mode, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub simulate_delay_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Checks clap cannot express on its own
    pub fn validate(&self) -> Result<(), AppError> {
        if self.simulate == Some(0) {
            return Err(AppError::InvalidArguments(
                "--simulate needs at least one source pair".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the multiplexer config: defaults, then the config file, then flags
    pub async fn resolve_config(&self) -> Result<MuxConfig, AppError> {
        let mut config = match &self.config {
            Some(path) => MuxConfig::load(path).await?,
            None => MuxConfig::default(),
        };

        if let Some(ms) = self.timeout_ms {
            config.per_source_timeout = Duration::from_millis(ms);
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(scope) = self.retry_scope {
            config.retry_scope = scope;
        }
        if let Some(size) = self.read_chunk_size {
            config.read_chunk_size = size;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn simulate_delay(&self) -> Duration {
        Duration::from_millis(self.simulate_delay_ms)
    }
}
