//! Lua interpreter host.
//!
//! Owns the interpreter state and everything registered into it before a
//! script runs: the `fio`/`sio` libraries, the recording `loadfile`/`dofile`
//! replacements, the `arg` table and the `texconfig` table.

mod fio;
#[cfg(test)]
mod test_fio_module;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mlua::{
    ChunkMode, DeserializeOptions, Function, Lua, LuaSerdeExt, MultiValue, Result as LuaResult,
    Table, Value,
};

use crate::config::{ConfigLayer, Interaction};
use crate::recorder::Recorder;

pub use fio::LuaFile;

const STDIN_DISABLED: &str = "reading from stdin is disabled in batch mode";

/// How the host was started.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Plain interpreter, no engine behind it.
    pub lua_only: bool,
    pub interaction: Interaction,
}

impl RuntimeOptions {
    fn stdin_allowed(&self) -> bool {
        self.lua_only || self.interaction != Interaction::Batch
    }
}

/// Lua runtime with the engine's libraries registered.
pub struct LuaRuntime {
    lua: Lua,
}

impl LuaRuntime {
    pub fn new(options: &RuntimeOptions, recorder: Arc<dyn Recorder>) -> LuaResult<Self> {
        let lua = Lua::new();

        {
            let globals = lua.globals();
            fio::register(&lua, &globals, recorder.clone())?;
            Self::register_loaders(&lua, &globals, *options, recorder)?;
            globals.set("texconfig", lua.create_table()?)?;
        }

        Ok(Self { lua })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Build the global `arg` table so that `args[script_index]` is `arg[0]`,
    /// and set `os.selfdir`.
    pub fn set_arguments(&self, args: &[String], script_index: usize) -> LuaResult<()> {
        let globals = self.lua.globals();
        let arg = self.lua.create_table()?;
        for (i, value) in args.iter().enumerate() {
            let key = i as i64 - script_index as i64;
            arg.raw_set(key, value.as_str())?;
        }
        globals.set("arg", arg)?;

        if let Some(selfdir) = self_dir(args.first().map(String::as_str)) {
            let os: Table = globals.get("os")?;
            os.set("selfdir", selfdir.to_string_lossy().to_string())?;
        }
        Ok(())
    }

    pub fn run_file(&self, path: &Path) -> LuaResult<()> {
        let chunk = std::fs::read(path)
            .map_err(|e| mlua::Error::external(format!("cannot open {}: {}", path.display(), e)))?;
        self.lua
            .load(skip_first_line_comment(chunk))
            .set_name(format!("@{}", path.display()))
            .exec()
    }

    pub fn run_string(&self, script: &str) -> LuaResult<()> {
        self.lua.load(script).exec()
    }

    /// Read back what the script left in `texconfig`.
    ///
    /// Unknown keys and values of other types (such as `texconfig.init`) are
    /// ignored.
    pub fn texconfig(&self) -> LuaResult<ConfigLayer> {
        let value: Value = self.lua.globals().get("texconfig")?;
        if !matches!(&value, Value::Table(table) if !table.is_empty()) {
            return Ok(ConfigLayer::default());
        }
        self.lua
            .from_value_with(value, DeserializeOptions::new().deny_unsupported_types(false))
    }

    /// Call `texconfig.init` when the script defined it. Returns whether it ran.
    pub fn call_texconfig_init(&self) -> LuaResult<bool> {
        let Value::Table(texconfig) = self.lua.globals().get::<Value>("texconfig")? else {
            return Ok(false);
        };
        match texconfig.get::<Value>("init")? {
            Value::Function(init) => {
                init.call::<()>(())?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn register_loaders(
        lua: &Lua,
        globals: &Table,
        options: RuntimeOptions,
        recorder: Arc<dyn Recorder>,
    ) -> LuaResult<()> {
        // loadfile(name [, mode [, env]]) -> chunk | nil, message
        let loadfile_recorder = recorder.clone();
        globals.set(
            "loadfile",
            lua.create_function(
                move |lua, (name, mode, env): (Option<String>, Option<String>, Option<Table>)| {
                    if name.is_none() && !options.stdin_allowed() {
                        return Ok((Value::Nil, Some(STDIN_DISABLED.to_string())));
                    }
                    match load_chunk(lua, name.as_deref(), mode.as_deref(), env) {
                        Ok(chunk) => {
                            if let Some(name) = &name {
                                loadfile_recorder.record_input(Path::new(name));
                            }
                            Ok((Value::Function(chunk), None))
                        }
                        Err(message) => Ok((Value::Nil, Some(message))),
                    }
                },
            )?,
        )?;

        // dofile(name) -> whatever the chunk returns, raising on load errors
        globals.set(
            "dofile",
            lua.create_function(move |lua, name: Option<String>| {
                if name.is_none() && !options.stdin_allowed() {
                    return Ok(MultiValue::from_vec(vec![
                        Value::Nil,
                        Value::String(lua.create_string(STDIN_DISABLED)?),
                    ]));
                }
                let chunk =
                    load_chunk(lua, name.as_deref(), None, None).map_err(mlua::Error::runtime)?;
                if let Some(name) = &name {
                    recorder.record_input(Path::new(name));
                }
                chunk.call::<MultiValue>(())
            })?,
        )?;

        Ok(())
    }
}

/// Compile a file (or stdin when `name` is `None`) into a function.
fn load_chunk(
    lua: &Lua,
    name: Option<&str>,
    mode: Option<&str>,
    env: Option<Table>,
) -> Result<Function, String> {
    let (source, chunk_name) = match name {
        Some(name) => {
            let source = std::fs::read(name).map_err(|e| format!("cannot open {}: {}", name, e))?;
            (source, format!("@{}", name))
        }
        None => {
            let mut source = Vec::new();
            std::io::stdin()
                .read_to_end(&mut source)
                .map_err(|e| format!("cannot read stdin: {}", e))?;
            (source, "=stdin".to_string())
        }
    };

    let mut chunk = lua.load(skip_first_line_comment(source)).set_name(chunk_name);
    if let Some(mode) = mode.and_then(chunk_mode) {
        chunk = chunk.set_mode(mode);
    }
    if let Some(env) = env {
        chunk = chunk.set_environment(env);
    }
    chunk.into_function().map_err(|e| e.to_string())
}

/// Drop a UTF-8 byte order mark and blank out a first line starting with
/// `#`. The newline stays so line numbers in messages still match the file.
fn skip_first_line_comment(mut source: Vec<u8>) -> Vec<u8> {
    if source.starts_with(b"\xef\xbb\xbf") {
        source.drain(..3);
    }
    if source.first() == Some(&b'#') {
        let end = source
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(source.len());
        source.drain(..end);
    }
    source
}

/// "t" and "b" restrict loading, "bt" (or anything else) allows both.
fn chunk_mode(mode: &str) -> Option<ChunkMode> {
    match (mode.contains('t'), mode.contains('b')) {
        (true, false) => Some(ChunkMode::Text),
        (false, true) => Some(ChunkMode::Binary),
        _ => None,
    }
}

/// Directory holding the running program.
fn self_dir(program: Option<&str>) -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| program.and_then(|p| Path::new(p).parent().map(Path::to_path_buf)))
}
