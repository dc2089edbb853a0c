//! Vectorized reads: N consecutive scalars in one call.
//!
//! Bulk readers never fail on short data. They stop at the first value that
//! cannot be decoded in full and return what they have, so callers compare
//! the length against what they asked for.

use crate::error::DecodeError;
use crate::scalar::{ScalarFormat, Width, read_scalar};
use crate::source::ByteSource;

/// Upper bound on up-front allocation when the source size is unknown.
const MAX_PREALLOCATED: usize = 1 << 16;

fn clamp_count(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

/// Decode up to `count` scalars of one format.
///
/// Non-positive counts yield an empty table.
pub fn read_table<S: ByteSource + ?Sized>(source: &mut S, count: i64, format: ScalarFormat) -> Vec<i64> {
    let count = clamp_count(count);
    let capacity = source
        .remaining()
        .map_or(MAX_PREALLOCATED, |left| left / format.width.bytes())
        .min(count);
    let mut values = Vec::with_capacity(capacity);
    while values.len() < count {
        match read_scalar(source, format) {
            Some(value) => values.push(value),
            None => break,
        }
    }
    if values.len() < count {
        tracing::trace!(requested = count, decoded = values.len(), "bulk read truncated");
    }
    values
}

/// Big-endian unsigned table with a script-supplied width.
pub fn read_cardinal_table<S: ByteSource + ?Sized>(
    source: &mut S,
    count: i64,
    width: i64,
) -> Result<Vec<i64>, DecodeError> {
    let width = Width::try_from(width)?;
    Ok(read_table(source, count, ScalarFormat::cardinal(width)))
}

/// Big-endian two's-complement table with a script-supplied width.
pub fn read_integer_table<S: ByteSource + ?Sized>(
    source: &mut S,
    count: i64,
    width: i64,
) -> Result<Vec<i64>, DecodeError> {
    let width = Width::try_from(width)?;
    Ok(read_table(source, count, ScalarFormat::integer(width)))
}

/// Raw bytes, bypassing per-value decoding.
///
/// Same result as a 1-byte cardinal table but buffers copy one clamped
/// slice and streams do a single block read.
pub fn read_byte_table<S: ByteSource + ?Sized>(source: &mut S, count: i64) -> Vec<u8> {
    source.take_bytes(clamp_count(count))
}
