// ABOUTME: Chunked transport writer that frames payload bytes into protocol envelopes
// ABOUTME: Splits writes into fixed-size pieces and signals completion on close

use crate::constants::{chunking::DEFAULT_CHUNK_SIZE, flags, markers};
use std::io::{self, Write};

/// Wraps a sink so that every byte written to it is sent as part of a
/// chunked graphics transfer.
///
/// Each piece of at most `chunk_size` bytes is framed as
/// `ESC _G m=1; <piece> ESC \`. [`ChunkWriter::close`] sends the empty
/// `m=0` envelope that tells the terminal the transfer is complete.
#[derive(Debug)]
pub struct ChunkWriter<W: Write> {
    inner: W,
    chunk_size: usize,
    chunks_written: usize,
    bytes_written: usize,
    failed: bool,
}

/// Normalise a requested chunk size.
///
/// Zero selects the default. Anything else is rounded down to a multiple of
/// 4 (at least 4) so that every non-final piece of base64 decodes on its own.
pub fn aligned_chunk_size(requested: usize) -> usize {
    match requested {
        0 => DEFAULT_CHUNK_SIZE,
        n => (n - n % 4).max(4),
    }
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
    }

    /// `chunk_size` goes through [`aligned_chunk_size`].
    pub fn with_chunk_size(inner: W, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: aligned_chunk_size(chunk_size),
            chunks_written: 0,
            bytes_written: 0,
            failed: false,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of data-bearing envelopes fully written so far
    pub fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    /// Payload bytes carried by fully written envelopes
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Send the terminating envelope and hand back the sink.
    pub fn close(mut self) -> io::Result<W> {
        write!(
            self.inner,
            "{}{};{}",
            markers::START,
            flags::NO_MORE_DATA,
            markers::END
        )?;
        log::trace!("closed chunked transfer after {} chunks", self.chunks_written);
        Ok(self.inner)
    }

    fn write_envelope(&mut self, piece: &[u8]) -> io::Result<()> {
        write!(self.inner, "{}{};", markers::START, flags::MORE_DATA)?;
        self.inner.write_all(piece)?;
        self.inner.write_all(markers::END.as_bytes())?;
        self.chunks_written += 1;
        self.bytes_written += piece.len();
        Ok(())
    }
}

impl<W: Write> Write for ChunkWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A failed envelope may be half written; nothing after it can be framed.
        if self.failed {
            return Err(io::Error::other(
                "chunked transfer aborted by an earlier write failure",
            ));
        }

        for piece in buf.chunks(self.chunk_size) {
            if let Err(e) = self.write_envelope(piece) {
                self.failed = true;
                return Err(e);
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
