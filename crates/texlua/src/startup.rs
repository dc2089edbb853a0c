//! Startup orchestration: from parsed flags to a running script or engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::Cli;
use crate::config::{ConfigLayer, EngineConfig};
use crate::error::{ConfigError, StartupError};
use crate::recorder::{FileRecorder, NullRecorder, Recorder};
use crate::runtime::{LuaRuntime, RuntimeOptions};

/// The engine's main processing loop.
pub trait Engine {
    /// Run with the resolved configuration and return the exit status.
    fn run(&mut self, runtime: &LuaRuntime, config: &EngineConfig) -> i32;
}

/// Prints the configuration it would run with.
#[derive(Debug, Default)]
pub struct DryRunEngine;

impl Engine for DryRunEngine {
    fn run(&mut self, _runtime: &LuaRuntime, config: &EngineConfig) -> i32 {
        match toml::to_string(config) {
            Ok(text) => {
                print!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("error: {}", e);
                1
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Run one script as a plain interpreter.
    LuaOnly,
    /// Run the optional startup script, then the engine.
    Engine,
}

/// Everything startup needs, independent of how it was parsed.
#[derive(Debug, Clone)]
pub struct Startup {
    pub mode: Mode,
    pub script: Option<PathBuf>,
    /// Full argument vector, program name included.
    pub args: Vec<String>,
    /// Index into `args` that becomes `arg[0]`.
    pub script_index: usize,
    pub ini: bool,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigLayer,
}

impl Startup {
    pub fn from_cli(cli: Cli, args: Vec<String>) -> Self {
        let program = args.first().map(String::as_str).unwrap_or_default();
        let mode = if cli.lua_only(program) {
            Mode::LuaOnly
        } else {
            Mode::Engine
        };
        let script = match mode {
            Mode::LuaOnly => cli.lua.clone().or_else(|| cli.args.first().map(PathBuf::from)),
            Mode::Engine => cli.lua.clone(),
        };
        let script_index = script
            .as_deref()
            .and_then(|script| script_index(&args, script))
            .unwrap_or(0);

        Self {
            mode,
            script,
            args,
            script_index,
            ini: cli.ini,
            config_path: cli.config.clone(),
            overrides: cli.overrides(),
        }
    }

    pub fn run(self, engine: &mut dyn Engine) -> Result<i32, StartupError> {
        let mut config = EngineConfig::load(self.config_path.as_deref())?;
        config.apply(self.overrides.clone());

        let recorder = self.recorder(&config)?;
        let options = RuntimeOptions {
            lua_only: self.mode == Mode::LuaOnly,
            interaction: config.interaction,
        };
        let runtime = LuaRuntime::new(&options, recorder).map_err(StartupError::Interpreter)?;
        runtime
            .set_arguments(&self.args, self.script_index)
            .map_err(StartupError::Interpreter)?;

        match self.mode {
            Mode::LuaOnly => {
                let script = self.script.as_deref().ok_or(StartupError::NoScript)?;
                self.run_script(&runtime, script)?;
                Ok(0)
            }
            Mode::Engine => {
                if let Some(script) = self.script.as_deref() {
                    self.run_script(&runtime, script)?;
                    config.apply(runtime.texconfig().map_err(ConfigError::Table)?);
                }
                if config.formatname.is_none() && !self.ini {
                    return Err(StartupError::NoFormat);
                }
                runtime.call_texconfig_init().map_err(StartupError::Init)?;
                tracing::debug!(?config, "handing over to the engine");
                Ok(engine.run(&runtime, &config))
            }
        }
    }

    fn run_script(&self, runtime: &LuaRuntime, script: &Path) -> Result<(), StartupError> {
        tracing::debug!(script = %script.display(), "running script");
        runtime.run_file(script).map_err(|source| StartupError::Script {
            path: script.to_path_buf(),
            source,
        })
    }

    fn recorder(&self, config: &EngineConfig) -> Result<Arc<dyn Recorder>, StartupError> {
        if !config.recorder {
            return Ok(Arc::new(NullRecorder));
        }
        let path = PathBuf::from(format!("{}.fls", self.job_name(config)));
        let recorder = FileRecorder::create(&path).map_err(|source| StartupError::Recorder {
            path: path.clone(),
            source,
        })?;
        Ok(Arc::new(recorder))
    }

    /// Configured job name, else the script's stem, else "texput".
    fn job_name(&self, config: &EngineConfig) -> String {
        config
            .jobname
            .clone()
            .or_else(|| {
                self.script
                    .as_deref()
                    .and_then(Path::file_stem)
                    .map(|stem| stem.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "texput".to_string())
    }
}

/// Position of the script in the raw argument vector.
fn script_index(args: &[String], script: &Path) -> Option<usize> {
    let script = script.to_string_lossy();
    let inline = format!("--lua={}", script);
    args.iter().enumerate().skip(1).find_map(|(i, arg)| {
        if *arg == inline || *arg == *script {
            Some(i)
        } else {
            None
        }
    })
}
