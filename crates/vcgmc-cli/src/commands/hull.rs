use crate::cli::HullArgs;
use crate::error::Result;
use crate::utils::files::{read_configuration, write_configuration};
use tracing::info;
use vcgmc::engine::config::HullConfig;
use vcgmc::engine::progress::ProgressReporter;
use vcgmc::workflows;

pub fn run(args: HullArgs) -> Result<()> {
    let state = read_configuration(args.input.as_deref())?;
    let config = HullConfig {
        topology_path: args.topology,
        expand: args.expand,
    };

    info!("Invoking the hull workflow...");
    let hulled = workflows::hull::run(&state, &config, &ProgressReporter::new())?;
    info!(area = hulled.area(), "Hull boundary ready.");

    write_configuration(&hulled, args.output.as_deref())
}
