//! Lua host for a typesetting engine.
//!
//! Scripts get two binary decoding libraries on top of the standard Lua
//! libraries: `fio` reads from open files, `sio` from strings.
//!
//! ```lua
//! local f = assert(fio.open("font.otf"))
//! local version = f:readcardinal4()
//! local count = f:readcardinal2()
//! f:setposition(12)
//! local record = string.char(table.unpack(f:readbytetable(16)))
//! local tag = sio.readcardinal4(record, 1)
//! f:close()
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod recorder;
pub mod runtime;
pub mod startup;

pub use config::{EngineConfig, Interaction};
pub use error::{ConfigError, StartupError};
pub use recorder::{FileRecorder, NullRecorder, Recorder};
pub use runtime::{LuaFile, LuaRuntime, RuntimeOptions};
pub use startup::{DryRunEngine, Engine, Startup};
