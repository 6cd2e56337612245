use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Tunables of the Metropolis sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorConfig {
    /// Initial global translation scale.
    pub dl_max: f64,
    /// Ceiling of every object's personal step bound, and the value those
    /// bounds are reset to.
    pub initial_dl_max: f64,
    /// Steps between global step-bound recalibrations.
    pub i_adjust: usize,
    /// Attempts an object makes with the global bound before it switches to
    /// its own adaptive moves.
    pub n_try: u64,
    pub rot_flag: bool,
    pub mobility_reset_interval: usize,
    pub move_mix_factor: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            dl_max: 1.0,
            initial_dl_max: 1.0,
            i_adjust: 1000,
            n_try: 200,
            rot_flag: false,
            mobility_reset_interval: 2000,
            move_mix_factor: 0.5,
        }
    }
}

#[derive(Default)]
pub struct IntegratorConfigBuilder {
    dl_max: Option<f64>,
    initial_dl_max: Option<f64>,
    i_adjust: Option<usize>,
    n_try: Option<u64>,
    rot_flag: Option<bool>,
    mobility_reset_interval: Option<usize>,
    move_mix_factor: Option<f64>,
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

fn non_zero(name: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: "must be at least 1".to_string(),
        })
    }
}

impl IntegratorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dl_max(mut self, dl_max: f64) -> Self {
        self.dl_max = Some(dl_max);
        self
    }
    pub fn initial_dl_max(mut self, dl_max: f64) -> Self {
        self.initial_dl_max = Some(dl_max);
        self
    }
    pub fn i_adjust(mut self, steps: usize) -> Self {
        self.i_adjust = Some(steps);
        self
    }
    pub fn n_try(mut self, attempts: u64) -> Self {
        self.n_try = Some(attempts);
        self
    }
    pub fn rot_flag(mut self, enabled: bool) -> Self {
        self.rot_flag = Some(enabled);
        self
    }
    pub fn mobility_reset_interval(mut self, steps: usize) -> Self {
        self.mobility_reset_interval = Some(steps);
        self
    }
    pub fn move_mix_factor(mut self, factor: f64) -> Self {
        self.move_mix_factor = Some(factor);
        self
    }

    /// Fills unset fields from [`IntegratorConfig::default`] and validates.
    pub fn build(self) -> Result<IntegratorConfig, ConfigError> {
        let defaults = IntegratorConfig::default();
        let move_mix_factor = self.move_mix_factor.unwrap_or(defaults.move_mix_factor);
        if !(0.0..=1.0).contains(&move_mix_factor) {
            return Err(ConfigError::InvalidParameter {
                name: "move_mix_factor",
                reason: format!("must lie in [0, 1], got {move_mix_factor}"),
            });
        }
        Ok(IntegratorConfig {
            dl_max: positive("dl_max", self.dl_max.unwrap_or(defaults.dl_max))?,
            initial_dl_max: positive(
                "initial_dl_max",
                self.initial_dl_max.unwrap_or(defaults.initial_dl_max),
            )?,
            i_adjust: non_zero("i_adjust", self.i_adjust.unwrap_or(defaults.i_adjust))?,
            n_try: self.n_try.unwrap_or(defaults.n_try),
            rot_flag: self.rot_flag.unwrap_or(defaults.rot_flag),
            mobility_reset_interval: non_zero(
                "mobility_reset_interval",
                self.mobility_reset_interval
                    .unwrap_or(defaults.mobility_reset_interval),
            )?,
            move_mix_factor,
        })
    }
}

/// Input files of an NVT run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfig {
    pub forcefield_path: PathBuf,
    pub topology_path: PathBuf,
}

/// Parameters of a complete NVT run.
#[derive(Debug, Clone, PartialEq)]
pub struct NvtConfig {
    pub resources: ResourceConfig,
    pub n_steps: usize,
    pub report_interval: usize,
    /// Steps between trajectory frames; `None` writes no trajectory.
    pub trajectory_interval: Option<usize>,
    pub beta: f64,
    /// Carried through to reports; the NVT ensemble does not use it.
    pub pressure: f64,
    /// Requests periodic boundaries. Only honoured for rectangular boxes.
    pub periodic: bool,
    pub filter_radius: f64,
    pub integrator: IntegratorConfig,
}

#[derive(Default)]
pub struct NvtConfigBuilder {
    forcefield_path: Option<PathBuf>,
    topology_path: Option<PathBuf>,
    n_steps: Option<usize>,
    report_interval: Option<usize>,
    trajectory_interval: Option<usize>,
    beta: Option<f64>,
    pressure: Option<f64>,
    periodic: Option<bool>,
    filter_radius: Option<f64>,
    integrator: Option<IntegratorConfig>,
}

impl NvtConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forcefield_path(mut self, path: PathBuf) -> Self {
        self.forcefield_path = Some(path);
        self
    }
    pub fn topology_path(mut self, path: PathBuf) -> Self {
        self.topology_path = Some(path);
        self
    }
    pub fn n_steps(mut self, steps: usize) -> Self {
        self.n_steps = Some(steps);
        self
    }
    pub fn report_interval(mut self, steps: usize) -> Self {
        self.report_interval = Some(steps);
        self
    }
    pub fn trajectory_interval(mut self, steps: Option<usize>) -> Self {
        self.trajectory_interval = steps;
        self
    }
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }
    pub fn pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }
    pub fn periodic(mut self, periodic: bool) -> Self {
        self.periodic = Some(periodic);
        self
    }
    pub fn filter_radius(mut self, radius: f64) -> Self {
        self.filter_radius = Some(radius);
        self
    }
    pub fn integrator(mut self, config: IntegratorConfig) -> Self {
        self.integrator = Some(config);
        self
    }

    pub fn build(self) -> Result<NvtConfig, ConfigError> {
        let resources = ResourceConfig {
            forcefield_path: self
                .forcefield_path
                .ok_or(ConfigError::MissingParameter("forcefield_path"))?,
            topology_path: self
                .topology_path
                .ok_or(ConfigError::MissingParameter("topology_path"))?,
        };
        let n_steps = non_zero(
            "n_steps",
            self.n_steps.ok_or(ConfigError::MissingParameter("n_steps"))?,
        )?;
        let report_interval = non_zero(
            "report_interval",
            self.report_interval
                .ok_or(ConfigError::MissingParameter("report_interval"))?,
        )?;
        let trajectory_interval = match self.trajectory_interval {
            Some(steps) => Some(non_zero("trajectory_interval", steps)?),
            None => None,
        };
        let beta = self.beta.ok_or(ConfigError::MissingParameter("beta"))?;
        if beta.is_nan() || beta < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "beta",
                reason: format!("must not be negative, got {beta}"),
            });
        }
        let pressure = self.pressure.unwrap_or(1.0);
        if pressure.is_nan() || pressure < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "pressure",
                reason: format!("must not be negative, got {pressure}"),
            });
        }
        let filter_radius = self.filter_radius.unwrap_or(0.0);
        if filter_radius.is_nan() || filter_radius < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "filter_radius",
                reason: format!("must not be negative, got {filter_radius}"),
            });
        }
        Ok(NvtConfig {
            resources,
            n_steps,
            report_interval,
            trajectory_interval,
            beta,
            pressure,
            periodic: self.periodic.unwrap_or(false),
            filter_radius,
            integrator: self.integrator.unwrap_or_default(),
        })
    }
}

/// Parameters of a hull run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HullConfig {
    /// Topology giving atom radii; required when `expand` is set.
    pub topology_path: Option<PathBuf>,
    /// Grow the hull until it contains every atom, not just every centre.
    pub expand: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nvt_builder() -> NvtConfigBuilder {
        NvtConfigBuilder::new()
            .forcefield_path("ff.txt".into())
            .topology_path("topo.toml".into())
            .n_steps(1000)
            .report_interval(100)
            .beta(1.0)
    }

    #[test]
    fn integrator_builder_fills_defaults() {
        let config = IntegratorConfigBuilder::new().rot_flag(true).build().unwrap();
        assert_eq!(
            config,
            IntegratorConfig {
                rot_flag: true,
                ..IntegratorConfig::default()
            }
        );
    }

    #[test]
    fn integrator_builder_rejects_bad_values() {
        assert_eq!(
            IntegratorConfigBuilder::new().i_adjust(0).build(),
            Err(ConfigError::InvalidParameter {
                name: "i_adjust",
                reason: "must be at least 1".to_string(),
            })
        );
        assert!(IntegratorConfigBuilder::new().dl_max(-1.0).build().is_err());
        assert!(IntegratorConfigBuilder::new().move_mix_factor(1.5).build().is_err());
    }

    #[test]
    fn nvt_builder_requires_core_parameters() {
        assert_eq!(
            NvtConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("forcefield_path"))
        );
        assert_eq!(
            NvtConfigBuilder::new()
                .forcefield_path("ff.txt".into())
                .topology_path("topo.toml".into())
                .build(),
            Err(ConfigError::MissingParameter("n_steps"))
        );
    }

    #[test]
    fn nvt_builder_applies_defaults_and_validates() {
        let config = nvt_builder().build().unwrap();
        assert_eq!(config.pressure, 1.0);
        assert_eq!(config.filter_radius, 0.0);
        assert!(!config.periodic);
        assert_eq!(config.trajectory_interval, None);
        assert_eq!(config.integrator, IntegratorConfig::default());

        assert!(nvt_builder().beta(-0.5).build().is_err());
        assert!(nvt_builder().report_interval(0).build().is_err());
        assert!(nvt_builder().trajectory_interval(Some(0)).build().is_err());
        assert!(nvt_builder().filter_radius(-1.0).build().is_err());
    }
}
