use std::path::Path;

use futures::io::AsyncRead as FuturesAsyncRead;
use tokio::fs::File;
use tokio_util::compat::FuturesAsyncReadCompatExt;

use super::error::IoError;
use crate::source::BoxedReader;

/// Open every path as a source, in order
///
/// Fails on the first path that cannot be opened; nothing is read yet.
pub async fn open_sources<P>(paths: &[P]) -> Result<Vec<BoxedReader>, IoError>
where
    P: AsRef<Path>,
{
    let mut sources: Vec<BoxedReader> = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        sources.push(Box::new(file));
    }
    Ok(sources)
}

/// Adapt a `futures` reader so it can be used as a source
pub fn from_futures<R>(reader: R) -> BoxedReader
where
    R: FuturesAsyncRead + Send + Unpin + 'static,
{
    Box::new(reader.compat())
}
