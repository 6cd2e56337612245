use crate::cli::NvtArgs;
use crate::config::PartialNvtConfig;
use crate::error::Result;
use crate::utils::files::{read_configuration, write_configuration};
use crate::utils::progress::CliProgressHandler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::{info, warn};
use vcgmc::core::io::trajectory::TrajectoryWriter;
use vcgmc::engine::progress::ProgressReporter;
use vcgmc::workflows::{self, nvt::WriterSink};

pub fn run(args: NvtArgs, seed: Option<u64>, quiet: bool) -> Result<()> {
    let progress = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    run_with_progress(args, seed, progress)
}

fn run_with_progress(args: NvtArgs, seed: Option<u64>, progress: CliProgressHandler) -> Result<()> {
    let partial = match &args.config {
        Some(path) => PartialNvtConfig::from_file(path)?,
        None => PartialNvtConfig::default(),
    };
    info!("Merging configuration from run file and CLI arguments...");
    let config = partial.merge_with_cli(&args)?;

    let initial = read_configuration(args.input.as_deref())?;

    let seed = seed.unwrap_or_else(|| rand::thread_rng().r#gen());
    info!(seed, "Seeding the random number generator.");
    let mut rng = StdRng::seed_from_u64(seed);

    let reports: Box<dyn Write> = match &args.report_file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stderr()),
    };
    let trajectory = match (&args.trajectory, config.trajectory_interval) {
        (Some(path), Some(_)) => Some(TrajectoryWriter::create(path)?),
        (Some(path), None) => {
            warn!("No frame frequency given; trajectory {:?} will not be written.", path);
            None
        }
        _ => None,
    };
    let mut sink = WriterSink::new(reports, trajectory);

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    info!("Invoking the NVT workflow...");
    let result = workflows::nvt::run(initial, &config, &mut sink, &mut rng, &reporter)?;
    info!(
        steps = result.steps,
        relief_steps = result.relief_steps,
        energy = result.energy,
        frames = sink.frames(),
        "Workflow finished."
    );

    write_configuration(&result.final_state, args.output.as_deref())
}
