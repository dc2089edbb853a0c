//! Binary decoders for script-side parsing of font and resource files.
//!
//! Every decoder reads through a [`ByteSource`]. Two sources exist:
//! - [`StreamSource`]: an open, seekable stream. Reads advance the stream.
//! - [`BufferSource`]: a borrowed byte slice addressed by a 1-based offset.
//!   Reads never touch the slice and the offset is never written back.
//!
//! End of data is not an error. Scalar decoders return `None`, bulk readers
//! return a truncated `Vec`. The only errors are argument misuse (a table
//! width outside 1..=4) and failed seeks.
//!
//! ```
//! use texlua_fio::{BufferSource, ScalarFormat, Width, read_scalar};
//!
//! let data = [0xff, 0xfe];
//! let mut source = BufferSource::at(&data, 1);
//! assert_eq!(read_scalar(&mut source, ScalarFormat::integer(Width::Two)), Some(-2));
//! ```

mod bulk;
mod error;
mod fixed;
mod line;
mod ops;
mod position;
mod scalar;
mod source;

pub use bulk::{read_byte_table, read_cardinal_table, read_integer_table, read_table};
pub use error::DecodeError;
pub use fixed::{FixedFormat, fixed2_from_bits, fixed4_from_bits, read_fixed, two_dot_fourteen_from_bits};
pub use line::read_line;
pub use ops::{OPERATIONS, Operation, OperationSpec, Sources};
pub use scalar::{ByteOrder, ScalarFormat, Signedness, Width, assemble, read_scalar, sign_extend};
pub use source::{BufferSource, ByteSource, StreamSource};
