//! Line splitting for streams.

use std::io::BufRead;

use crate::source::{ByteSource, StreamSource};

const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Read through the next LF, CR or CR LF and return the line without its
/// terminator.
///
/// `None` only when the stream is already at its end. An empty line is
/// `Some(vec![])`. Bytes are returned as is.
pub fn read_line<R: BufRead>(source: &mut StreamSource<R>) -> Option<Vec<u8>> {
    let mut line = Vec::new();
    loop {
        match source.next_byte() {
            None if line.is_empty() => return None,
            None | Some(LF) => return Some(line),
            Some(CR) => {
                if source.peek_byte() == Some(LF) {
                    source.next_byte();
                }
                return Some(line);
            }
            Some(byte) => line.push(byte),
        }
    }
}
