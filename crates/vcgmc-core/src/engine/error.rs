use thiserror::Error;

use super::config::ConfigError;
use crate::core::configuration::ResourceMismatch;
use crate::core::configuration::boundary::GeometryError;
use crate::core::forcefield::params::ForceFieldError;
use crate::core::io::config_file::ConfigFileError;
use crate::core::models::topology::TopologyLoadError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load configuration: {source}")]
    ConfigFile {
        #[from]
        source: ConfigFileError,
    },

    #[error("Failed to load force field: {source}")]
    ForceField {
        #[from]
        source: ForceFieldError,
    },

    #[error("Failed to load topology: {source}")]
    Topology {
        #[from]
        source: TopologyLoadError,
    },

    #[error("Force field, topology and configuration disagree: {source}")]
    Resources {
        #[from]
        source: ResourceMismatch,
    },

    #[error("Boundary geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Invalid run parameters: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Unable to relieve initial clashes in {steps} steps")]
    Equilibration { steps: usize },

    #[error("Failed to write run output: {0}")]
    Sink(String),
}
