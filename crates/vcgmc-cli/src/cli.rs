use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "vcgmc - Metropolis Monte Carlo sampling of rigid coarse-grained discs in two dimensions.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Seed for the random number generator. A random seed is drawn and
    /// logged when omitted.
    #[arg(long, global = true, value_name = "INT")]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a Monte Carlo trajectory in the NVT ensemble.
    Nvt(NvtArgs),
    /// Replace the boundary of a configuration with the convex hull of its objects.
    Hull(HullArgs),
}

/// Arguments for the `nvt` subcommand.
#[derive(Args, Debug, Default)]
pub struct NvtArgs {
    // --- Run Parameters ---
    /// Number of simulation steps.
    #[arg(value_name = "N_STEPS")]
    pub n_steps: Option<usize>,

    /// Steps between reports.
    #[arg(value_name = "PRINT_FREQUENCY")]
    pub report_every: Option<usize>,

    /// Inverse temperature 1/(kB T) scaling the force field energies.
    #[arg(value_name = "BETA")]
    pub beta: Option<f64>,

    /// Pressure, reported but unused by the NVT ensemble.
    #[arg(value_name = "PRESSURE")]
    pub pressure: Option<f64>,

    // --- Files ---
    /// Run file in TOML format with `[run]` and `[integrator]` tables.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Initial configuration. Read from stdin when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Final configuration. Written to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Topology file describing the objects.
    #[arg(short, long, value_name = "PATH")]
    pub topology: Option<PathBuf>,

    /// Force field file.
    #[arg(short, long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// File receiving the run reports. Reports go to stderr when omitted.
    #[arg(short = 'l', long, value_name = "PATH")]
    pub report_file: Option<PathBuf>,

    /// Trajectory file receiving configuration frames.
    #[arg(short = 's', long, value_name = "PATH")]
    pub trajectory: Option<PathBuf>,

    /// Steps between trajectory frames.
    #[arg(short = 'n', long, value_name = "INT")]
    pub frame_every: Option<usize>,

    // --- Sampling Overrides ---
    /// Request periodic boundaries. Ignored for non-rectangular boundaries.
    #[arg(short, long)]
    pub periodic: bool,

    /// Allow rotations in the first moves of every object.
    #[arg(short = 'R', long)]
    pub rotate: bool,

    /// Pre-filter radius for pair distances. Zero disables the filter.
    #[arg(short = 'r', long, value_name = "FLOAT")]
    pub filter_radius: Option<f64>,
}

/// Arguments for the `hull` subcommand.
#[derive(Args, Debug, Default)]
pub struct HullArgs {
    /// Input configuration. Read from stdin when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output configuration. Written to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Topology file giving atom radii, needed by --expand.
    #[arg(short, long, value_name = "PATH")]
    pub topology: Option<PathBuf>,

    /// Grow the hull until it contains every atom, not only object centres.
    #[arg(short, long)]
    pub expand: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nvt_accepts_positional_run_parameters() {
        let cli = Cli::parse_from([
            "vcgmc", "nvt", "-t", "topo.toml", "-f", "disc.ff", "-p", "1000", "100", "2.5", "1.0",
        ]);
        match cli.command {
            Commands::Nvt(args) => {
                assert_eq!(args.n_steps, Some(1000));
                assert_eq!(args.report_every, Some(100));
                assert_eq!(args.beta, Some(2.5));
                assert_eq!(args.pressure, Some(1.0));
                assert!(args.periodic);
                assert!(!args.rotate);
                assert_eq!(args.topology, Some(PathBuf::from("topo.toml")));
            }
            other => panic!("expected nvt, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["vcgmc", "hull", "--expand", "-vv", "--seed", "42"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.seed, Some(42));
        assert!(matches!(cli.command, Commands::Hull(HullArgs { expand: true, .. })));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["vcgmc", "-q", "-v", "hull"]).is_err());
    }
}
