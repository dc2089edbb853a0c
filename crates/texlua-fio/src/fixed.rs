//! Fixed-point formats found in font metric tables.

use crate::scalar::{ScalarFormat, Width, read_scalar};
use crate::source::ByteSource;

/// Big-endian fixed-point encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedFormat {
    /// Unsigned 8.8, two bytes.
    Fixed2,
    /// 16.16, four bytes.
    Fixed4,
    /// Signed 2.14, two bytes.
    TwoDotFourteen,
}

impl FixedFormat {
    pub const fn width(self) -> Width {
        match self {
            FixedFormat::Fixed2 | FixedFormat::TwoDotFourteen => Width::Two,
            FixedFormat::Fixed4 => Width::Four,
        }
    }
}

pub fn fixed2_from_bits(n: u16) -> f64 {
    f64::from(n >> 8) + f64::from(n & 0xff) / 256.0
}

pub fn fixed4_from_bits(n: u32) -> f64 {
    f64::from(n >> 16) + f64::from(n & 0xffff) / 65536.0
}

pub fn two_dot_fourteen_from_bits(n: u16) -> f64 {
    // move the two integer bits to the top of a 32-bit word, then shift
    // back down arithmetically so they come out sign-extended
    let integer = ((u32::from(n) << 16) as i32) >> 30;
    f64::from(integer) + f64::from(n & 0x3fff) / 16384.0
}

/// Decode one fixed-point value, or `None` on insufficient bytes.
pub fn read_fixed<S: ByteSource + ?Sized>(source: &mut S, format: FixedFormat) -> Option<f64> {
    let raw = read_scalar(source, ScalarFormat::cardinal(format.width()))?;
    // a cardinal of the format's width always fits its bit pattern
    Some(match format {
        FixedFormat::Fixed2 => fixed2_from_bits(raw as u16),
        FixedFormat::Fixed4 => fixed4_from_bits(raw as u32),
        FixedFormat::TwoDotFourteen => two_dot_fourteen_from_bits(raw as u16),
    })
}
