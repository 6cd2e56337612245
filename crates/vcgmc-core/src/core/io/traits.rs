use crate::core::configuration::Configuration;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing configuration file formats.
pub trait StateFile {
    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads a configuration from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Configuration, Self::Error>;

    /// Writes a configuration to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(state: &Configuration, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a configuration from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Configuration, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a configuration to a file path, replacing any existing file.
    fn write_to_path<P: AsRef<Path>>(state: &Configuration, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(state, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
