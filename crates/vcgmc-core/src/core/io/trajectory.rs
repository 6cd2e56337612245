use crate::core::configuration::Configuration;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Appends configuration snapshots, each preceded by a `====<step>====` line.
pub struct TrajectoryWriter<W: Write> {
    writer: W,
    frames: usize,
}

impl TrajectoryWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    pub fn write_frame(&mut self, step: usize, state: &Configuration) -> io::Result<()> {
        write_frame(&mut self.writer, step, state)?;
        self.frames += 1;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub fn write_frame(writer: &mut impl Write, step: usize, state: &Configuration) -> io::Result<()> {
    writeln!(writer, "===={}====", step)?;
    state.write(writer)
}
