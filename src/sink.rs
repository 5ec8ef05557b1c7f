//! In-memory sink for encoded output
//!
//! The Parquet writer streams its pages into a [`BufferedSink`]; once the
//! file footer is written the sink is finalized into a single [`Bytes`]
//! buffer that can be handed to a blob store.
//!
//! The sink enforces no size limit. Bounding the input is up to the caller.

use bytes::{Bytes, BytesMut};
use std::io::Write;

/// Append-only buffer of written chunks
#[derive(Debug, Default)]
pub struct BufferedSink {
    chunks: Vec<Bytes>,
    len: usize,
}

impl BufferedSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk after everything written so far
    pub fn write_chunk(&mut self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return;
        }
        self.len += chunk.len();
        self.chunks.push(chunk);
    }

    /// Total bytes written
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty chunks retained
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Concatenate all chunks in write order
    ///
    /// Consumes the sink: nothing can be written after finalizing.
    pub fn finalize(self) -> Bytes {
        match self.chunks.len() {
            0 => Bytes::new(),
            1 => self.chunks.into_iter().next().unwrap_or_default(),
            _ => {
                let mut out = BytesMut::with_capacity(self.len);
                for chunk in &self.chunks {
                    out.extend_from_slice(chunk);
                }
                out.freeze()
            }
        }
    }
}

impl Write for BufferedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_chunk(Bytes::copy_from_slice(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_preserves_write_order() {
        let mut sink = BufferedSink::new();
        sink.write_chunk(&b"PAR1"[..]);
        sink.write_chunk(b"-body-".to_vec());
        sink.write_chunk(Bytes::from_static(b"PAR1"));

        assert_eq!(sink.len(), 14);
        assert_eq!(sink.chunk_count(), 3);
        assert_eq!(sink.finalize(), Bytes::from_static(b"PAR1-body-PAR1"));
    }

    #[test]
    fn test_empty_sink() {
        let sink = BufferedSink::new();
        assert!(sink.is_empty());
        assert!(sink.finalize().is_empty());
    }

    #[test]
    fn test_empty_chunks_are_skipped() {
        let mut sink = BufferedSink::new();
        sink.write_chunk(Bytes::new());
        sink.write_chunk(&b"x"[..]);
        assert_eq!(sink.chunk_count(), 1);
        assert_eq!(sink.finalize(), Bytes::from_static(b"x"));
    }

    #[test]
    fn test_io_write() {
        let mut sink = BufferedSink::new();
        write!(sink, "a,b").unwrap();
        sink.write_all(b"\n1,2\n").unwrap();
        sink.flush().unwrap();
        assert_eq!(&sink.finalize()[..], b"a,b\n1,2\n");
    }
}
