//! `OutputBuffer`: single-syscall output buffer for terminal writes.

use std::io::{self, Write};

/// Pre-allocated buffer that accumulates queued terminal commands.
///
/// Every composite screen update is built here, then flushed in a
/// single `write()` syscall to prevent flickering mid-update.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create an output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical bottom region (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flush the accumulated bytes to `writer` in one syscall and clear
    /// the buffer.
    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if !self.data.is_empty() {
            writer.write_all(&self.data)?;
            writer.flush()?;
            self.data.clear();
        }
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_and_flushes_once() {
        let mut out = OutputBuffer::new();
        out.write_all(b"abc").unwrap();
        out.write_all(b"def").unwrap();
        assert_eq!(out.len(), 6);

        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"abcdef");
        assert!(out.is_empty());
    }
}
