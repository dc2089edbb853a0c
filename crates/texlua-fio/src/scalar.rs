//! Fixed-width cardinal and two's-complement integer decoding.

use crate::error::DecodeError;
use crate::source::ByteSource;

/// Number of bytes in a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Width {
    pub const ALL: [Width; 4] = [Width::One, Width::Two, Width::Three, Width::Four];

    pub const fn bytes(self) -> usize {
        self as usize
    }

    pub const fn bits(self) -> u32 {
        8 * self as u32
    }
}

impl TryFrom<i64> for Width {
    type Error = DecodeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Width::One),
            2 => Ok(Width::Two),
            3 => Ok(Width::Three),
            4 => Ok(Width::Four),
            other => Err(DecodeError::UnsupportedWidth(other)),
        }
    }
}

/// Which end of the encoded bytes holds the most significant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signedness {
    /// Unsigned.
    Cardinal,
    /// Two's complement.
    Integer,
}

/// Everything needed to decode one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarFormat {
    pub width: Width,
    pub order: ByteOrder,
    pub signedness: Signedness,
}

impl ScalarFormat {
    /// Big-endian unsigned.
    pub const fn cardinal(width: Width) -> Self {
        Self {
            width,
            order: ByteOrder::BigEndian,
            signedness: Signedness::Cardinal,
        }
    }

    /// Big-endian two's complement.
    pub const fn integer(width: Width) -> Self {
        Self {
            width,
            order: ByteOrder::BigEndian,
            signedness: Signedness::Integer,
        }
    }

    pub const fn little_endian(self) -> Self {
        Self {
            order: ByteOrder::LittleEndian,
            ..self
        }
    }
}

/// Combine up to four raw bytes, in the order they were read, into an
/// unsigned value.
pub fn assemble(raw: &[u8], order: ByteOrder) -> u32 {
    debug_assert!(raw.len() <= 4);
    let push = |value: u32, byte: &u8| (value << 8) | u32::from(*byte);
    match order {
        ByteOrder::BigEndian => raw.iter().fold(0, push),
        ByteOrder::LittleEndian => raw.iter().rev().fold(0, push),
    }
}

/// Reinterpret an unsigned `width`-byte value as two's complement.
///
/// The sign lives in the top bit of the most significant byte, whichever
/// end of the encoding that byte was read from.
pub fn sign_extend(value: u32, width: Width) -> i64 {
    let value = i64::from(value);
    let bits = width.bits();
    if value >= 1 << (bits - 1) {
        value - (1 << bits)
    } else {
        value
    }
}

/// Decode one scalar. `None` when fewer than `width` bytes remain.
///
/// Bytes already taken from a stream before it ran dry stay consumed.
pub fn read_scalar<S: ByteSource + ?Sized>(source: &mut S, format: ScalarFormat) -> Option<i64> {
    let width = format.width.bytes();
    if !source.has(width) {
        return None;
    }
    let mut raw = [0u8; 4];
    for slot in &mut raw[..width] {
        *slot = source.next_byte()?;
    }
    let value = assemble(&raw[..width], format.order);
    Some(match format.signedness {
        Signedness::Cardinal => i64::from(value),
        Signedness::Integer => sign_extend(value, format.width),
    })
}
