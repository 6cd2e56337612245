use crate::cli::NvtArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use vcgmc::engine::config as core_config;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialRunConfig {
    forcefield: Option<PathBuf>,
    topology: Option<PathBuf>,
    steps: Option<usize>,
    report_every: Option<usize>,
    frame_every: Option<usize>,
    beta: Option<f64>,
    pressure: Option<f64>,
    periodic: Option<bool>,
    filter_radius: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialIntegratorConfig {
    dl_max: Option<f64>,
    initial_dl_max: Option<f64>,
    i_adjust: Option<usize>,
    n_try: Option<u64>,
    rotate: Option<bool>,
    mobility_reset_interval: Option<usize>,
    move_mix_factor: Option<f64>,
}

/// Contents of a TOML run file. Every value is optional; command-line
/// arguments take precedence.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialNvtConfig {
    run: Option<PartialRunConfig>,
    integrator: Option<PartialIntegratorConfig>,
}

impl PartialNvtConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| CliError::RunFile {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn merge_with_cli(self, args: &NvtArgs) -> Result<core_config::NvtConfig> {
        let run = self.run.unwrap_or_default();
        let integrator = Self::merge_integrator(self.integrator.unwrap_or_default(), args)?;

        let forcefield_path = args
            .forcefield
            .clone()
            .or(run.forcefield)
            .ok_or(CliError::MissingInput("force field"))?;
        let topology_path = args
            .topology
            .clone()
            .or(run.topology)
            .ok_or(CliError::MissingInput("topology"))?;

        let trajectory_interval = args.frame_every.or(run.frame_every).filter(|&n| n > 0);
        if trajectory_interval.is_some() && args.trajectory.is_none() {
            return Err(CliError::Argument(
                "A trajectory file (-s) is required when a frame frequency is set.".to_string(),
            ));
        }

        let mut builder = core_config::NvtConfigBuilder::new()
            .forcefield_path(forcefield_path)
            .topology_path(topology_path)
            .trajectory_interval(trajectory_interval)
            .periodic(args.periodic || run.periodic.unwrap_or(false))
            .integrator(integrator);
        if let Some(steps) = args.n_steps.or(run.steps) {
            builder = builder.n_steps(steps);
        }
        if let Some(every) = args.report_every.or(run.report_every) {
            builder = builder.report_interval(every);
        }
        if let Some(beta) = args.beta.or(run.beta) {
            builder = builder.beta(beta);
        }
        if let Some(pressure) = args.pressure.or(run.pressure) {
            builder = builder.pressure(pressure);
        }
        if let Some(radius) = args.filter_radius.or(run.filter_radius) {
            builder = builder.filter_radius(radius);
        }

        Ok(builder.build()?)
    }

    fn merge_integrator(
        partial: PartialIntegratorConfig,
        args: &NvtArgs,
    ) -> Result<core_config::IntegratorConfig> {
        let mut builder = core_config::IntegratorConfigBuilder::new()
            .rot_flag(args.rotate || partial.rotate.unwrap_or(false));
        if let Some(dl_max) = partial.dl_max {
            builder = builder.dl_max(dl_max);
        }
        if let Some(dl_max) = partial.initial_dl_max {
            builder = builder.initial_dl_max(dl_max);
        }
        if let Some(steps) = partial.i_adjust {
            builder = builder.i_adjust(steps);
        }
        if let Some(attempts) = partial.n_try {
            builder = builder.n_try(attempts);
        }
        if let Some(steps) = partial.mobility_reset_interval {
            builder = builder.mobility_reset_interval(steps);
        }
        if let Some(factor) = partial.move_mix_factor {
            builder = builder.move_mix_factor(factor);
        }
        Ok(builder.build()?)
    }
}
