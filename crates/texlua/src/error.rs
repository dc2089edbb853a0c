use std::path::PathBuf;

/// Failure while resolving the engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid texconfig table")]
    Table(#[source] mlua::Error),
}

/// Failure before or during the hand-off to the engine.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("No script file given")]
    NoScript,
    #[error("no format given, quitting")]
    NoFormat,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create recorder file {path}")]
    Recorder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to set up the Lua interpreter")]
    Interpreter(#[source] mlua::Error),
    #[error("error in {path}")]
    Script {
        path: PathBuf,
        #[source]
        source: mlua::Error,
    },
    #[error("texconfig.init failed")]
    Init(#[source] mlua::Error),
}
