//! Errors raised by the decoding layer.

/// Failures that are not plain end of data.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported width {0}, expected 1, 2, 3 or 4 bytes")]
    UnsupportedWidth(i64),

    #[error("cannot position stream at negative offset {0}")]
    NegativePosition(i64),

    #[error("skipping by {0} overflows the stream offset")]
    PositionOverflow(i64),

    #[error("seek failed: {0}")]
    Seek(#[source] std::io::Error),
}
