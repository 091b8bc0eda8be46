use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use super::error::ConfigError;
use crate::source::guard::DEFAULT_CHUNK_SIZE;

/// Default deadline for a single read attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Default number of consecutive timeouts tolerated
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// How consecutive timeouts are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryScope {
    /// One counter for the whole stream, reset by any record from any source
    #[default]
    Global,
    /// One counter per source, reset only by a record from that source
    PerSource,
}

impl FromStr for RetryScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(RetryScope::Global),
            "per-source" | "per_source" => Ok(RetryScope::PerSource),
            other => Err(ConfigError::InvalidRetryScope(other.to_string())),
        }
    }
}

impl fmt::Display for RetryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryScope::Global => f.write_str("global"),
            RetryScope::PerSource => f.write_str("per-source"),
        }
    }
}

/// Multiplexer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxConfig {
    pub delimiter: u8,
    pub per_source_timeout: Duration,
    pub max_retries: usize,
    pub read_chunk_size: usize,
    pub retry_scope: RetryScope,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\n',
            per_source_timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            read_chunk_size: DEFAULT_CHUNK_SIZE,
            retry_scope: RetryScope::Global,
        }
    }
}

impl MuxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_source_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    pub fn with_retry_scope(mut self, scope: RetryScope) -> Self {
        self.retry_scope = scope;
        self
    }

    /// Reject settings the scheduler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        if self.per_source_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.read_chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }

    /// Parse a TOML document, starting from the defaults
    ///
    /// # Example
    /// ```toml
    /// delimiter = "\\n"
    /// per_source_timeout_ms = 250
    /// max_retries = 5
    /// retry_scope = "per-source"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let config = file.apply(Self::default())?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&content)
    }
}

/// On-disk shape of [`MuxConfig`]; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    delimiter: Option<String>,
    per_source_timeout_ms: Option<u64>,
    max_retries: Option<usize>,
    read_chunk_size: Option<usize>,
    retry_scope: Option<RetryScope>,
}

impl ConfigFile {
    fn apply(self, mut config: MuxConfig) -> Result<MuxConfig, ConfigError> {
        if let Some(delimiter) = self.delimiter {
            config.delimiter = parse_delimiter(&delimiter)?;
        }
        if let Some(ms) = self.per_source_timeout_ms {
            config.per_source_timeout = Duration::from_millis(ms);
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(size) = self.read_chunk_size {
            config.read_chunk_size = size;
        }
        if let Some(scope) = self.retry_scope {
            config.retry_scope = scope;
        }
        Ok(config)
    }
}

/// Parse a one-byte delimiter
///
/// Accepts a single ASCII character, the escapes `\n`, `\r`, `\t`, `\0`, or a
/// hex byte such as `0x1e`.
pub fn parse_delimiter(input: &str) -> Result<u8, ConfigError> {
    let invalid = || ConfigError::InvalidDelimiter(input.to_string());

    match input {
        "\\n" => return Ok(b'\n'),
        "\\r" => return Ok(b'\r'),
        "\\t" => return Ok(b'\t'),
        "\\0" => return Ok(0),
        _ => {}
    }

    if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        return u8::from_str_radix(hex, 16).map_err(|_| invalid());
    }

    match input.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(invalid()),
    }
}
