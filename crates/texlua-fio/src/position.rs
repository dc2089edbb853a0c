//! Stream position control. Buffers have no counterpart: their position is
//! always the offset the caller passes in.

use std::io::{Seek, SeekFrom};

use crate::error::DecodeError;
use crate::source::StreamSource;

impl<R: Seek> StreamSource<R> {
    /// Current absolute offset.
    pub fn position(&mut self) -> Result<u64, DecodeError> {
        self.get_mut().stream_position().map_err(DecodeError::Seek)
    }

    /// Move to an absolute offset and return it.
    pub fn set_position(&mut self, offset: i64) -> Result<u64, DecodeError> {
        let target = u64::try_from(offset).map_err(|_| DecodeError::NegativePosition(offset))?;
        self.get_mut()
            .seek(SeekFrom::Start(target))
            .map_err(DecodeError::Seek)
    }

    /// Move by `delta` relative to the current offset and return the new one.
    pub fn skip_position(&mut self, delta: i64) -> Result<u64, DecodeError> {
        let current = self.position()?;
        let target = i64::try_from(current)
            .ok()
            .and_then(|current| current.checked_add(delta))
            .ok_or(DecodeError::PositionOverflow(delta))?;
        self.set_position(target)
    }
}
