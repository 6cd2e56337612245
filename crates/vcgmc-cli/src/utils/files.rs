use crate::error::{CliError, Result};
use std::io;
use std::path::Path;
use tracing::info;
use vcgmc::core::configuration::Configuration;
use vcgmc::core::io::config_file::ConfigFile;
use vcgmc::core::io::traits::StateFile;
use vcgmc::engine::error::EngineError;

/// Reads a configuration from `path`, or from stdin when there is none.
pub fn read_configuration(path: Option<&Path>) -> Result<Configuration> {
    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            ConfigFile::read_from_path(path).map_err(|source| CliError::Configuration {
                path: path.to_path_buf(),
                source,
            })
        }
        None => {
            info!("Loading configuration from stdin.");
            let mut stdin = io::stdin().lock();
            ConfigFile::read_from(&mut stdin).map_err(|e| CliError::Engine(EngineError::from(e)))
        }
    }
}

/// Writes `state` to `path`, or to stdout when there is none.
pub fn write_configuration(state: &Configuration, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            info!("Writing configuration to {:?}", path);
            ConfigFile::write_to_path(state, path).map_err(|e| CliError::Engine(e.into()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            ConfigFile::write_to(state, &mut stdout).map_err(|e| CliError::Engine(e.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn configuration_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.cfg");
        let output = dir.path().join("out.cfg");
        fs::write(&input, "10 10\n2\n0 1.0 2.0 0.0\n0 5.0 5.0 1.5\n").unwrap();

        let state = read_configuration(Some(&input)).unwrap();
        write_configuration(&state, Some(&output)).unwrap();
        let copy = read_configuration(Some(&output)).unwrap();
        assert_eq!(copy.n_objects(), 2);
        assert_eq!(copy.width(), 10.0);
    }

    #[test]
    fn malformed_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.cfg");
        fs::write(&input, "10 10\n1\n0 1.0\n").unwrap();
        match read_configuration(Some(&input)) {
            Err(CliError::Configuration { path, .. }) => assert_eq!(path, input),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
