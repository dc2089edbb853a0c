//! Tests for the `fio` and `sio` Lua libraries.

use super::{LuaRuntime, RuntimeOptions};
use crate::recorder::{MemoryRecorder, NullRecorder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const SAMPLE: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0xff, 0xfe, 0x80, 0x00];

/// Runtime with `path` pointing at a file holding `data`.
fn runtime_with_file(dir: &TempDir, data: &[u8]) -> (LuaRuntime, PathBuf) {
    let path = dir.path().join("sample.bin");
    std::fs::write(&path, data).unwrap();
    let runtime = LuaRuntime::new(&RuntimeOptions::default(), Arc::new(NullRecorder)).unwrap();
    set_path(&runtime, &path);
    (runtime, path)
}

fn set_path(runtime: &LuaRuntime, path: &Path) {
    runtime
        .lua()
        .globals()
        .set("path", path.to_string_lossy().to_string())
        .unwrap();
}

#[test]
fn stream_scalars() {
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(&dir, SAMPLE);
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        local first = fio.readcardinal1(f)
        assert(first == 1 and math.type(first) == "integer", "cardinal1")
        assert(fio.readcardinal2(f) == 0x0203, "cardinal2")
        assert(fio.readinteger1(f) == 4, "integer1")
        assert(fio.readinteger2(f) == -2, "integer2")
        assert(fio.readinteger2(f) == -32768, "integer2 min")
        assert(fio.readcardinal1(f) == nil, "end of data")
        f:close()
        "#,
    );
    assert!(result.is_ok(), "stream scalars failed: {:?}", result);
}

#[test]
fn stream_little_endian() {
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(&dir, SAMPLE);
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path, "rb"))
        assert(f:readcardinal2le() == 0x0201, "cardinal2le")
        f:setposition(0)
        assert(f:readcardinal3le() == 0x030201, "cardinal3le")
        f:setposition(0)
        assert(f:readcardinal4le() == 0x04030201, "cardinal4le")
        f:setposition(4)
        assert(f:readinteger2le() == -257, "integer2le")
        f:setposition(4)
        assert(f:readinteger3le() == 0x80feff - 0x1000000, "integer3le")
        f:setposition(4)
        assert(f:readinteger4le() == 0x0080feff, "integer4le")
        f:setposition(4)
        assert(f:readinteger1le() == -1, "integer1le aliases integer1")
        assert(f:readcardinal1le() == 0xfe, "cardinal1le aliases cardinal1")
        "#,
    );
    assert!(result.is_ok(), "little endian failed: {:?}", result);
}

#[test]
fn stream_positions() {
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(&dir, SAMPLE);
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        assert(fio.getposition(f) == 0)
        assert(fio.readcardinal4(f) == 0x01020304)
        assert(fio.getposition(f) == 4)
        assert(fio.skipposition(f, -2) == 0)
        assert(fio.getposition(f) == 2)
        assert(fio.readcardinal2(f) == 0x0304)
        assert(fio.setposition(f, -1) == nil, "negative seek")
        assert(fio.skipposition(f, -100) == nil, "negative skip")
        assert(fio.skipposition(f, math.maxinteger) == nil, "overflowing skip")
        assert(fio.getposition(f) == 4, "failed seeks do not move")
        assert(fio.setposition(f, 100) == 0, "seek past end")
        assert(fio.readcardinal1(f) == nil)
        "#,
    );
    assert!(result.is_ok(), "positions failed: {:?}", result);
}

#[test]
fn stream_tables_and_bytes() {
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(&dir, SAMPLE);
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        local t = fio.readcardinaltable(f, 3, 2)
        assert(#t == 3 and t[1] == 258 and t[2] == 772 and t[3] == 65534, "cardinal table")

        f:setposition(0)
        t = fio.readintegertable(f, 3, 2)
        assert(t[1] == 258 and t[2] == 772 and t[3] == -2, "integer table")

        f:setposition(0)
        t = f:readcardinaltable(10, 4)
        assert(#t == 2, "truncated to what was available")
        assert(t[1] == 0x01020304 and t[2] == 0xfffe8000)

        f:setposition(0)
        local a, b, c = fio.readbytes(f, 3)
        assert(a == 1 and b == 2 and c == 3, "readbytes")
        assert(select('#', fio.readbytes(f, 0)) == 0)

        f:setposition(6)
        t = fio.readbytetable(f, 5)
        assert(#t == 2 and t[1] == 0x80 and t[2] == 0, "byte table")
        t = fio.readbytetable(f, 5)
        assert(type(t) == "table" and #t == 0, "empty byte table at end of stream")
        assert(#fio.readcardinaltable(f, -2, 1) == 0, "negative count")
        "#,
    );
    assert!(result.is_ok(), "tables failed: {:?}", result);
}

#[test]
fn stream_fixed_point() {
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(
        &dir,
        &[0x01, 0x80, 0x00, 0x02, 0x40, 0x00, 0xc0, 0x00, 0x80, 0x00],
    );
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        assert(fio.readfixed2(f) == 1.5, "fixed2")
        assert(fio.readfixed4(f) == 2.25, "fixed4")
        assert(fio.read2dot14(f) == -1.0, "2.14 negative")
        assert(fio.read2dot14(f) == -2.0, "2.14 minimum")
        assert(fio.readfixed2(f) == nil, "end of data")
        "#,
    );
    assert!(result.is_ok(), "fixed point failed: {:?}", result);
}

#[test]
fn stream_readline() {
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(&dir, b"abc\r\ndef\n\nlast\rx");
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        assert(fio.readline(f) == "abc")
        assert(f:readline() == "def")
        assert(f:readline() == "", "empty line")
        assert(f:readline() == "last", "lone cr")
        assert(f:readline() == "x", "unterminated")
        assert(f:readline() == nil)
        "#,
    );
    assert!(result.is_ok(), "readline failed: {:?}", result);
}

#[test]
fn handles() {
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(&dir, SAMPLE);
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        assert(tostring(f):match("^file %(0x%x+%)$"), tostring(f))
        assert(f:close() == true)
        assert(tostring(f) == "file (closed)")

        local ok, err = pcall(fio.readcardinal1, f)
        assert(not ok and tostring(err):find("attempt to use a closed file"), tostring(err))
        ok, err = pcall(f.close, f)
        assert(not ok, "double close")

        local missing, message = fio.open(path .. ".missing")
        assert(missing == nil and type(message) == "string", "open failure")

        ok, err = pcall(fio.open, path, "w")
        assert(not ok and tostring(err):find("invalid mode"), tostring(err))
        "#,
    );
    assert!(result.is_ok(), "handles failed: {:?}", result);
}

#[test]
fn argument_misuse_raises() {
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(&dir, SAMPLE);
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        local ok, err = pcall(fio.readcardinaltable, f, 1, 5)
        assert(not ok and tostring(err):find("unsupported width 5"), tostring(err))
        ok = pcall(fio.readintegertable, f, 1, 0)
        assert(not ok, "width 0")
        ok = pcall(fio.readcardinal1, "not a file")
        assert(not ok, "string instead of handle")
        ok = pcall(fio.readcardinal1, io.stdout)
        assert(not ok, "io handles are not fio handles")
        ok = pcall(sio.readcardinal1, {}, 1)
        assert(not ok, "table instead of string")
        ok = pcall(sio.readcardinaltable, "abc", 1, 2)
        assert(not ok, "missing width")
        "#,
    );
    assert!(result.is_ok(), "argument misuse failed: {:?}", result);
}

#[test]
fn buffer_scalars() {
    let runtime = LuaRuntime::new(&RuntimeOptions::default(), Arc::new(NullRecorder)).unwrap();
    let result = runtime.run_string(
        r#"
        local s = "\x01\x02\x03\x04\xff\xfe"
        assert(sio.readcardinal1(s, 1) == 1)
        assert(sio.readcardinal2(s, 1) == 258)
        assert(sio.readcardinal2(s, 5) == 65534)
        assert(sio.readinteger2(s, 5) == -2)
        assert(sio.readcardinal4(s, 1) == 0x01020304)
        assert(sio.readcardinal2le(s, 1) == 0x0201)
        assert(sio.readinteger3le(s, 4) == 0xfeff04 - 0x1000000)
        assert(sio.readcardinal2(s, 6) == nil, "straddles the end")
        assert(sio.readcardinal1(s, 7) == nil, "past the end")
        assert(sio.readcardinal1(s, 0) == nil, "offsets start at 1")
        assert(sio.readinteger4(s, -3) == nil, "negative offset")
        -- the buffer is never consumed
        assert(sio.readcardinal2(s, 1) == 258)
        assert(s == "\x01\x02\x03\x04\xff\xfe")
        "#,
    );
    assert!(result.is_ok(), "buffer scalars failed: {:?}", result);
}

#[test]
fn buffer_fixed_point() {
    let runtime = LuaRuntime::new(&RuntimeOptions::default(), Arc::new(NullRecorder)).unwrap();
    let result = runtime.run_string(
        r#"
        assert(sio.readfixed2("\x01\x80", 1) == 1.5)
        assert(sio.readfixed2("\x00\x01\x80", 2) == 1.5, "two bytes are enough")
        assert(sio.readfixed4("\x00\x01\x80\x00", 1) == 1.5)
        assert(sio.readfixed4("\x00\x01\x80", 1) == nil)
        assert(sio.read2dot14("\x40\x00", 1) == 1.0)
        assert(sio.read2dot14("\xc0\x00", 1) == -1.0)
        assert(sio.read2dot14("\x80\x00", 1) == -2.0)
        assert(math.type(sio.read2dot14("\x40\x00", 1)) == "float")
        "#,
    );
    assert!(result.is_ok(), "buffer fixed point failed: {:?}", result);
}

#[test]
fn buffer_tables_and_bytes() {
    let runtime = LuaRuntime::new(&RuntimeOptions::default(), Arc::new(NullRecorder)).unwrap();
    let result = runtime.run_string(
        r#"
        local s = "\x01\x02\x03\x04\xff\xfe"
        local t = sio.readcardinaltable(s, 1, 10, 2)
        assert(#t == 3 and t[3] == 65534, "truncated cardinal table")
        t = sio.readintegertable(s, 3, 2, 2)
        assert(t[1] == 772 and t[2] == -2)

        local a, b = sio.readbytes(s, 5, 4)
        assert(a == 255 and b == 254 and select('#', sio.readbytes(s, 5, 4)) == 2)
        assert(select('#', sio.readbytes(s, 7, 1)) == 0, "nothing past the end")
        assert(sio.readbytetable(s, 7, 1) == nil, "no table past the end")
        t = sio.readbytetable(s, 6, 3)
        assert(#t == 1 and t[1] == 254)
        t = sio.readbytetable(s, 1, 0)
        assert(type(t) == "table" and #t == 0)
        "#,
    );
    assert!(result.is_ok(), "buffer tables failed: {:?}", result);
}

#[test]
fn namespaces() {
    let runtime = LuaRuntime::new(&RuntimeOptions::default(), Arc::new(NullRecorder)).unwrap();
    let result = runtime.run_string(
        r#"
        local function count(t)
            local n = 0
            for _ in pairs(t) do n = n + 1 end
            return n
        end
        -- 27 stream operations plus open
        assert(count(fio) == 28, "fio size " .. count(fio))
        assert(count(sio) == 23, "sio size " .. count(sio))
        for _, name in ipairs({ "readline", "getposition", "setposition", "skipposition", "open" }) do
            assert(sio[name] == nil, name)
        end
        for name in pairs(sio) do
            assert(fio[name] ~= nil, name)
        end
        "#,
    );
    assert!(result.is_ok(), "namespaces failed: {:?}", result);
}

#[test]
fn stream_and_buffer_agree() {
    let data: Vec<u8> = (0..=255u8).rev().collect();
    let dir = TempDir::new().unwrap();
    let (runtime, _) = runtime_with_file(&dir, &data);
    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        local s = string.char(table.unpack(f:readbytetable(256)))
        for name, decode in pairs(sio) do
            if name:find("table") == nil and name ~= "readbytes" then
                for offset = 1, 256, 37 do
                    f:setposition(offset - 1)
                    local expected = decode(s, offset)
                    local got = fio[name](f)
                    assert(got == expected, name .. " at " .. offset)
                end
            end
        end
        "#,
    );
    assert!(result.is_ok(), "stream and buffer disagree: {:?}", result);
}

#[test]
fn open_is_recorded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("font.bin");
    std::fs::write(&path, SAMPLE).unwrap();
    let recorder = Arc::new(MemoryRecorder::default());
    let runtime = LuaRuntime::new(&RuntimeOptions::default(), recorder.clone()).unwrap();
    set_path(&runtime, &path);

    let result = runtime.run_string(
        r#"
        local f = assert(fio.open(path))
        f:readcardinaltable(4, 1)
        sio.readcardinal1("abc", 1)
        assert(fio.open(path .. ".missing") == nil)
        "#,
    );
    assert!(result.is_ok(), "recording failed: {:?}", result);
    assert_eq!(recorder.inputs(), vec![path]);
}
