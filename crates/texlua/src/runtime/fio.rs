//! The `fio` (file) and `sio` (string) decoding libraries.
//!
//! Functions are generated from the operation table: every stream operation
//! becomes `fio.<name>(file, ...)` and a method on file handles, every buffer
//! operation becomes `sio.<name>(string, offset, ...)`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use mlua::{
    IntoLuaMulti, Lua, MultiValue, Result as LuaResult, Table, UserData, UserDataMethods,
    UserDataRefMut, Value, Variadic,
};
use texlua_fio::{
    BufferSource, ByteSource, DecodeError, Operation, OperationSpec, StreamSource, read_byte_table,
    read_cardinal_table, read_fixed, read_integer_table, read_line, read_scalar,
};

use crate::recorder::Recorder;

type FileStream = StreamSource<BufReader<File>>;

/// Binary file handle returned by `fio.open`.
pub struct LuaFile {
    name: String,
    stream: Option<FileStream>,
}

impl LuaFile {
    fn new(name: String, file: File) -> Self {
        Self {
            name,
            stream: Some(StreamSource::new(BufReader::new(file))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn stream(&mut self) -> LuaResult<&mut FileStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| mlua::Error::runtime("attempt to use a closed file"))
    }
}

impl UserData for LuaFile {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method_mut("close", |_, this, ()| {
            this.stream()?;
            this.stream = None;
            tracing::trace!(file = %this.name, "closed");
            Ok(true)
        });
        methods.add_meta_method("__tostring", |_, this, ()| {
            Ok(if this.is_closed() {
                "file (closed)".to_string()
            } else {
                format!("file ({:p})", this)
            })
        });

        for spec in OperationSpec::stream_operations() {
            let operation = spec.operation;
            methods.add_method_mut(spec.name, move |lua, this, args: MultiValue| {
                stream_call(lua, operation, this.stream()?, args)
            });
        }
    }
}

pub(super) fn register(lua: &Lua, globals: &Table, recorder: Arc<dyn Recorder>) -> LuaResult<()> {
    let fio = lua.create_table()?;

    // fio.open(name [, mode]) -> file | nil, message
    fio.set(
        "open",
        lua.create_function(move |lua, (name, mode): (String, Option<String>)| {
            if let Some(mode) = mode.as_deref() {
                if !matches!(mode, "r" | "rb") {
                    return Err(mlua::Error::runtime(format!(
                        "invalid mode '{}', fio only opens files for reading",
                        mode
                    )));
                }
            }
            match File::open(&name) {
                Ok(file) => {
                    recorder.record_input(Path::new(&name));
                    let handle = lua.create_userdata(LuaFile::new(name, file))?;
                    Ok((Value::UserData(handle), None))
                }
                Err(e) => {
                    tracing::debug!(file = %name, "open failed: {}", e);
                    Ok((Value::Nil, Some(format!("{}: {}", name, e))))
                }
            }
        })?,
    )?;

    for spec in OperationSpec::stream_operations() {
        let operation = spec.operation;
        fio.set(
            spec.name,
            lua.create_function(
                move |lua, (mut file, args): (UserDataRefMut<LuaFile>, MultiValue)| {
                    stream_call(lua, operation, file.stream()?, args)
                },
            )?,
        )?;
    }

    let sio = lua.create_table()?;
    for spec in OperationSpec::buffer_operations() {
        let operation = spec.operation;
        let name = spec.name;
        sio.set(
            name,
            lua.create_function(
                move |lua, (data, offset, args): (mlua::String, i64, MultiValue)| {
                    let bytes = data.as_bytes();
                    buffer_call(lua, name, operation, BufferSource::at(&bytes, offset), args)
                },
            )?,
        )?;
    }

    globals.set("fio", fio.clone())?;
    globals.set("sio", sio.clone())?;

    let loaded: Table = globals.get::<Table>("package")?.get("loaded")?;
    loaded.set("fio", fio)?;
    loaded.set("sio", sio)?;

    Ok(())
}

/// Operations shared by both sources.
fn read_common<S: ByteSource>(
    lua: &Lua,
    operation: Operation,
    source: &mut S,
    args: MultiValue,
) -> LuaResult<Option<MultiValue>> {
    let values = match operation {
        Operation::Scalar(format) => read_scalar(source, format).into_lua_multi(lua)?,
        Operation::Fixed(format) => read_fixed(source, format).into_lua_multi(lua)?,
        Operation::CardinalTable => {
            let (count, width): (i64, i64) = lua.unpack_multi(args)?;
            let values = read_cardinal_table(source, count, width).map_err(mlua::Error::external)?;
            lua.create_sequence_from(values)?.into_lua_multi(lua)?
        }
        Operation::IntegerTable => {
            let (count, width): (i64, i64) = lua.unpack_multi(args)?;
            let values = read_integer_table(source, count, width).map_err(mlua::Error::external)?;
            lua.create_sequence_from(values)?.into_lua_multi(lua)?
        }
        Operation::Bytes => {
            let count: i64 = lua.unpack_multi(args)?;
            Variadic::from_iter(read_byte_table(source, count)).into_lua_multi(lua)?
        }
        Operation::ByteTable => {
            let count: i64 = lua.unpack_multi(args)?;
            lua.create_sequence_from(read_byte_table(source, count))?
                .into_lua_multi(lua)?
        }
        Operation::ReadLine
        | Operation::GetPosition
        | Operation::SetPosition
        | Operation::SkipPosition => return Ok(None),
    };
    Ok(Some(values))
}

fn stream_call(
    lua: &Lua,
    operation: Operation,
    stream: &mut FileStream,
    args: MultiValue,
) -> LuaResult<MultiValue> {
    if let Some(values) = read_common(lua, operation, stream, args.clone())? {
        return Ok(values);
    }
    match operation {
        Operation::ReadLine => match read_line(stream) {
            Some(line) => lua.create_string(&line)?.into_lua_multi(lua),
            None => Value::Nil.into_lua_multi(lua),
        },
        Operation::GetPosition => position_result(stream.position()).into_lua_multi(lua),
        Operation::SetPosition => {
            let offset: i64 = lua.unpack_multi(args)?;
            position_result(stream.set_position(offset).map(|_| 0)).into_lua_multi(lua)
        }
        Operation::SkipPosition => {
            let delta: i64 = lua.unpack_multi(args)?;
            position_result(stream.skip_position(delta).map(|_| 0)).into_lua_multi(lua)
        }
        _ => Ok(MultiValue::new()),
    }
}

fn buffer_call(
    lua: &Lua,
    name: &str,
    operation: Operation,
    mut source: BufferSource<'_>,
    args: MultiValue,
) -> LuaResult<MultiValue> {
    // past-the-end buffers give no table at all and no byte values
    if source.is_exhausted() {
        match operation {
            Operation::ByteTable => return Value::Nil.into_lua_multi(lua),
            Operation::Bytes => return Ok(MultiValue::new()),
            _ => {}
        }
    }
    read_common(lua, operation, &mut source, args)?
        .ok_or_else(|| mlua::Error::runtime(format!("sio.{} is not available for strings", name)))
}

/// Map a position result to the script's sentinel.
fn position_result(result: Result<u64, DecodeError>) -> Option<i64> {
    match result {
        Ok(position) => i64::try_from(position).ok(),
        Err(e) => {
            tracing::debug!("position operation failed: {}", e);
            None
        }
    }
}
