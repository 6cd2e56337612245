use std::path::PathBuf;
use thiserror::Error;
use vcgmc::core::io::config_file::ConfigFileError;
use vcgmc::engine::config::ConfigError;
use vcgmc::engine::error::EngineError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid run parameters: {0}")]
    Parameters(#[from] ConfigError),

    /// A required input file named neither in the run file nor on the
    /// command line.
    #[error("A {0} file is required either in the run file or via CLI argument")]
    MissingInput(&'static str),

    #[error("Failed to parse run file '{path}': {source}", path = path.display())]
    RunFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to read configuration '{path}': {source}", path = path.display())]
    Configuration {
        path: PathBuf,
        #[source]
        source: ConfigFileError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
