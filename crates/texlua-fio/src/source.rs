//! Byte cursors over open streams and in-memory buffers.

use std::io::{self, BufRead, Read};

/// Initial capacity for reads whose length is not known up front.
const READ_CHUNK: usize = 4096;

/// A position-tracking view that yields one raw byte at a time.
///
/// Decoders are written once against this trait and work with both
/// [`StreamSource`] and [`BufferSource`].
pub trait ByteSource {
    /// Consume the next byte. `None` means end of data.
    fn next_byte(&mut self) -> Option<u8>;

    /// Whether `count` more bytes may be read.
    ///
    /// Buffers answer exactly, without reading. Streams cannot look ahead
    /// and always answer `true`; exhaustion then shows up in `next_byte`.
    fn has(&self, count: usize) -> bool;

    /// Number of bytes left, when known without reading.
    fn remaining(&self) -> Option<usize> {
        None
    }

    /// Consume up to `count` raw bytes in one block.
    fn take_bytes(&mut self, count: usize) -> Vec<u8>;
}

// ============================================================================
// StreamSource
// ============================================================================

/// An open stream. Every byte read moves the underlying position forward.
///
/// Any stream reader shares its position with whoever else holds the same
/// handle; there is no locking.
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
}

impl<R> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> StreamSource<R> {
    /// Look at the next byte without consuming it.
    pub fn peek_byte(&mut self) -> Option<u8> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // getc cannot tell a read error from end of file either
                    tracing::trace!(error = %e, "stream read failed, treating as end of data");
                    return None;
                }
            }
        }
    }
}

impl<R: BufRead> ByteSource for StreamSource<R> {
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.inner.consume(1);
        Some(byte)
    }

    fn has(&self, _count: usize) -> bool {
        true
    }

    fn take_bytes(&mut self, count: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(count.min(READ_CHUNK));
        if let Err(e) = (&mut self.inner).take(count as u64).read_to_end(&mut out) {
            tracing::trace!(error = %e, read = out.len(), "stream read failed mid block");
        }
        out
    }
}

// ============================================================================
// BufferSource
// ============================================================================

/// A borrowed byte buffer read from a caller-supplied offset.
///
/// The cursor is a local copy of the offset; the buffer itself is never
/// written and nothing is read outside `[0, len)`.
#[derive(Debug, Clone, Copy)]
pub struct BufferSource<'a> {
    data: &'a [u8],
    /// 0-based index of the next byte. `None` for offsets below 1.
    index: Option<usize>,
}

impl<'a> BufferSource<'a> {
    /// Start reading at the 1-based `offset` used by scripts.
    ///
    /// Offsets below 1 produce a cursor that yields nothing.
    pub fn at(data: &'a [u8], offset: i64) -> Self {
        let index = offset
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok());
        Self { data, index }
    }

    /// Start reading at the 0-based `index`.
    pub fn from_index(data: &'a [u8], index: usize) -> Self {
        Self {
            data,
            index: Some(index),
        }
    }

    /// The 1-based offset of the next byte, if the cursor is valid.
    pub fn offset(&self) -> Option<i64> {
        self.index
            .and_then(|index| i64::try_from(index).ok())
            .map(|index| index + 1)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Whether the cursor points at or past the end of the buffer.
    pub fn is_exhausted(&self) -> bool {
        !self.has(1)
    }
}

impl ByteSource for BufferSource<'_> {
    fn next_byte(&mut self) -> Option<u8> {
        let index = self.index?;
        let byte = *self.data.get(index)?;
        self.index = Some(index + 1);
        Some(byte)
    }

    fn has(&self, count: usize) -> bool {
        self.index
            .and_then(|index| index.checked_add(count))
            .is_some_and(|end| end <= self.data.len())
    }

    fn remaining(&self) -> Option<usize> {
        Some(
            self.index
                .map_or(0, |index| self.data.len().saturating_sub(index)),
        )
    }

    fn take_bytes(&mut self, count: usize) -> Vec<u8> {
        let Some(index) = self.index else {
            return Vec::new();
        };
        let start = index.min(self.data.len());
        let end = start.saturating_add(count).min(self.data.len());
        self.index = Some(end);
        self.data[start..end].to_vec()
    }
}
