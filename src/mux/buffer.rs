use bytes::{Buf, Bytes, BytesMut};

/// Holds the one record currently owed to the caller
///
/// Filled with a whole record, then drained in whatever sizes the caller
/// asks for. Only an empty buffer accepts a new record.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    inner: BytesMut,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Store `record`; the buffer must be empty
    pub fn push(&mut self, record: &[u8]) {
        debug_assert!(self.inner.is_empty(), "record buffer already holds a record");
        self.inner.extend_from_slice(record);
    }

    /// Copy up to `buf.len()` bytes out, keeping the rest
    pub fn drain_into(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.inner.len());
        self.inner.copy_to_slice(&mut buf[..n]);
        n
    }

    /// Take whatever remains of the current record
    pub fn take(&mut self) -> Bytes {
        self.inner.split().freeze()
    }
}
