//! Input recording.
//!
//! Every file a script opens through `fio.open`, `loadfile` or `dofile` is
//! reported to a [`Recorder`]. The file recorder writes the list in the
//! `.fls` layout build tools already understand:
//!
//! ```text
//! PWD /home/user/doc
//! INPUT fonts/lmroman10-regular.otf
//! INPUT setup.lua
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait Recorder: Send + Sync {
    fn record_input(&self, path: &Path);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn record_input(&self, _path: &Path) {}
}

/// Appends `INPUT` lines to a recorder file.
#[derive(Debug)]
pub struct FileRecorder {
    path: PathBuf,
    out: Mutex<BufWriter<File>>,
}

impl FileRecorder {
    /// Create (truncate) `path` and write the `PWD` header.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        let cwd = std::env::current_dir()?;
        writeln!(out, "PWD {}", cwd.display())?;
        out.flush()?;
        Ok(Self {
            path: path.to_path_buf(),
            out: Mutex::new(out),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Recorder for FileRecorder {
    fn record_input(&self, path: &Path) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let written = writeln!(out, "INPUT {}", path.display()).and_then(|()| out.flush());
        if let Err(e) = written {
            tracing::warn!(recorder = %self.path.display(), "failed to record input: {}", e);
        }
    }
}

/// Keeps recorded paths in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryRecorder {
    pub inputs: Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl MemoryRecorder {
    pub fn inputs(&self) -> Vec<PathBuf> {
        self.inputs.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Recorder for MemoryRecorder {
    fn record_input(&self, path: &Path) {
        self.inputs.lock().unwrap().push(path.to_path_buf());
    }
}
