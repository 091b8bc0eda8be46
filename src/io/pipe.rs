use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::error::IoError;
use crate::mux::{ReadOutcome, RoundRobinScheduler};

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Drive `mux` to completion, writing every byte to `writer`
///
/// Returns the number of bytes written. The writer is flushed even when the
/// multiplexer fails, so everything delivered before the failure reaches it.
pub async fn copy_records<W>(mux: &mut RoundRobinScheduler, writer: &mut W) -> Result<u64, IoError>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    let result = loop {
        match mux.read(&mut buf).await {
            Ok(ReadOutcome::Data(n)) => {
                writer.write_all(&buf[..n]).await?;
                written += n as u64;
            }
            Ok(ReadOutcome::EndOfStream) => break Ok(written),
            Err(e) => break Err(IoError::from(e)),
        }
    };

    writer.flush().await?;
    debug!(bytes = written, "Copied merged stream");
    result
}
