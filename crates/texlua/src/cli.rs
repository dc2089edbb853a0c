//! Command line surface.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{ConfigLayer, Interaction, InteractionSetting};

#[derive(Debug, Parser)]
#[command(name = "texlua", version, about = "Lua host for a typesetting engine")]
pub struct Cli {
    /// Startup script (the script to run in lua-only mode)
    #[arg(long, value_name = "FILE")]
    pub lua: Option<PathBuf>,

    /// Run the script as a plain Lua interpreter and exit
    #[arg(long)]
    pub luaonly: bool,

    /// Format to load
    #[arg(long, value_name = "FORMAT")]
    pub fmt: Option<String>,

    /// Name of the job and its output files
    #[arg(long, value_name = "NAME")]
    pub jobname: Option<String>,

    /// batchmode, nonstopmode, scrollmode or errorstopmode
    #[arg(long, value_name = "MODE")]
    pub interaction: Option<String>,

    /// Run without a format (initex)
    #[arg(long)]
    pub ini: bool,

    /// Stop at the first error
    #[arg(long)]
    pub halt_on_error: bool,

    /// Report errors as file:line:error
    #[arg(long, overrides_with = "no_file_line_error")]
    pub file_line_error: bool,

    /// Report errors in the classic style
    #[arg(long, overrides_with = "file_line_error")]
    pub no_file_line_error: bool,

    /// Report times in UTC
    #[arg(long)]
    pub utc: bool,

    /// Write a list of every input file to <jobname>.fls
    #[arg(long)]
    pub recorder: bool,

    /// Use this config file instead of the global and project ones
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Script (lua-only mode) and arguments handed to it
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Whether the host acts as a plain interpreter, either by flag or by
    /// being invoked under a `texlua` name.
    pub fn lua_only(&self, program: &str) -> bool {
        self.luaonly || invoked_as_texlua(program)
    }

    /// Flags that override configuration files.
    pub fn overrides(&self) -> ConfigLayer {
        let interaction = self.interaction.as_deref().and_then(|name| {
            let mode = Interaction::from_name(name);
            if mode.is_none() {
                tracing::warn!("ignoring unknown interaction mode {}", name);
            }
            mode.map(InteractionSetting::Name)
        });
        let file_line_error = if self.file_line_error {
            Some(true)
        } else if self.no_file_line_error {
            Some(false)
        } else {
            None
        };
        ConfigLayer {
            formatname: self.fmt.clone(),
            jobname: self.jobname.clone(),
            file_line_error,
            halt_on_error: self.halt_on_error.then_some(true),
            interaction,
            use_utc_time: self.utc.then_some(true),
            recorder: self.recorder.then_some(true),
            ..Default::default()
        }
    }
}

fn invoked_as_texlua(program: &str) -> bool {
    Path::new(program)
        .file_name()
        .is_some_and(|name| name.to_string_lossy().contains("texlua"))
}
