use std::io::{self, Read};

/// A forward-only reader that tracks how many bytes have been consumed
///
/// When the total length of the document is known up front (a regular file,
/// an in-memory buffer) the cursor refuses to read past it, which lets the
/// decoder tell a truncated document apart from one with trailing bytes.
/// Streams of unknown length (like stdin) are read until the source runs dry.
pub struct ByteCursor<R: Read> {
    inner: R,
    position: u64,
    declared_len: Option<u64>,
}

impl<R: Read> ByteCursor<R> {
    /// Create a cursor over a stream of unknown length
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            position: 0,
            declared_len: None,
        }
    }

    /// Create a cursor over a source holding exactly `len` bytes
    pub fn with_len(inner: R, len: u64) -> Self {
        Self {
            inner,
            position: 0,
            declared_len: Some(len),
        }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total length of the source, if known
    pub fn declared_len(&self) -> Option<u64> {
        self.declared_len
    }

    /// Bytes left before the declared length, if known
    pub fn remaining(&self) -> Option<u64> {
        self.declared_len
            .map(|len| len.saturating_sub(self.position))
    }
}

impl<R: Read> Read for ByteCursor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = match self.remaining() {
            Some(0) => return Ok(0),
            Some(left) => buf.len().min(usize::try_from(left).unwrap_or(usize::MAX)),
            None => buf.len(),
        };

        let n = self.inner.read(&mut buf[..want])?;
        self.position += n as u64;
        Ok(n)
    }
}
