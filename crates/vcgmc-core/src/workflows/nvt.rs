use crate::core::configuration::Configuration;
use crate::core::forcefield::params::ForceField;
use crate::core::io::trajectory::TrajectoryWriter;
use crate::core::models::topology::Topology;
use crate::core::observe::TracingObserver;
use crate::engine::config::{IntegratorConfig, NvtConfig};
use crate::engine::error::EngineError;
use crate::engine::integrator::Integrator;
use crate::engine::progress::{Progress, ProgressReporter};
use rand::Rng;
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, info, instrument, warn};

/// Clash relief gives up after this many steps per object.
const RELIEF_STEPS_PER_OBJECT: usize = 2000;

/// Move statistics of one object at report time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectReport {
    pub index: usize,
    pub n_good: u64,
    pub n_bad: u64,
    pub n_rotation: u64,
    pub n_translation: u64,
}

/// Global move tallies of the production integrator since its last
/// step-bound recalibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveSummary {
    pub accepted: u64,
    pub attempted: u64,
    pub dl_max: f64,
}

/// A snapshot of the run written at the start, after clash relief and at
/// every report interval of the production phase.
#[derive(Debug, Clone, PartialEq)]
pub struct StateReport {
    pub step: usize,
    pub n_objects: usize,
    pub pressure: f64,
    pub beta: f64,
    pub area: f64,
    pub density: f64,
    pub energy: f64,
    pub moves: Option<MoveSummary>,
    pub objects: Vec<ObjectReport>,
}

impl StateReport {
    fn capture(
        state: &Configuration,
        config: &NvtConfig,
        step: usize,
        energy: f64,
        integrator: Option<&Integrator>,
    ) -> Self {
        let (moves, objects) = match integrator {
            Some(integrator) => (
                Some(MoveSummary {
                    accepted: integrator.n_good,
                    attempted: integrator.n_good + integrator.n_bad,
                    dl_max: integrator.dl_max,
                }),
                state
                    .objects()
                    .iter()
                    .enumerate()
                    .map(|(index, object)| ObjectReport {
                        index,
                        n_good: object.stats.n_good,
                        n_bad: object.stats.n_bad,
                        n_rotation: object.stats.n_rotation,
                        n_translation: object.stats.n_translation,
                    })
                    .collect(),
            ),
            None => (None, Vec::new()),
        };
        Self {
            step,
            n_objects: state.n_objects(),
            pressure: config.pressure,
            beta: config.beta,
            area: state.area(),
            density: state.density(),
            energy,
            moves,
            objects,
        }
    }
}

impl fmt::Display for StateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "After {} steps N = {}, P = {}, beta = {}",
            self.step, self.n_objects, self.pressure, self.beta
        )?;
        writeln!(
            f,
            "Area = {}, Density = {} Energy = {}",
            self.area, self.density, self.energy
        )?;
        if let Some(moves) = &self.moves {
            writeln!(
                f,
                "Moves {} in {}, Dist_max = {}",
                moves.accepted, moves.attempted, moves.dl_max
            )?;
        }
        for object in &self.objects {
            writeln!(
                f,
                "obj_number = {}, n_good = {}, n_bad = {}, n rotation = {}, n translation = {}",
                object.index, object.n_good, object.n_bad, object.n_rotation, object.n_translation
            )?;
        }
        Ok(())
    }
}

/// Destination of the reports and trajectory frames a run produces.
pub trait RunSink {
    fn report(&mut self, report: &StateReport) -> io::Result<()>;

    fn frame(&mut self, step: usize, state: &Configuration) -> io::Result<()>;

    /// Called once after the last frame.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes reports as text to one writer and frames to an optional
/// trajectory.
pub struct WriterSink<L: Write, T: Write> {
    log: L,
    trajectory: Option<TrajectoryWriter<T>>,
}

impl<L: Write, T: Write> WriterSink<L, T> {
    pub fn new(log: L, trajectory: Option<TrajectoryWriter<T>>) -> Self {
        Self { log, trajectory }
    }

    pub fn frames(&self) -> usize {
        self.trajectory.as_ref().map_or(0, TrajectoryWriter::frames)
    }

    pub fn into_parts(self) -> (L, Option<TrajectoryWriter<T>>) {
        (self.log, self.trajectory)
    }
}

impl<L: Write, T: Write> RunSink for WriterSink<L, T> {
    fn report(&mut self, report: &StateReport) -> io::Result<()> {
        writeln!(self.log, "{report}")
    }

    fn frame(&mut self, step: usize, state: &Configuration) -> io::Result<()> {
        match &mut self.trajectory {
            Some(trajectory) => trajectory.write_frame(step, state),
            None => Ok(()),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        if let Some(trajectory) = &mut self.trajectory {
            trajectory.flush()?;
        }
        self.log.flush()
    }
}

fn sink_error(error: io::Error) -> EngineError {
    EngineError::Sink(error.to_string())
}

#[derive(Debug, Clone)]
pub struct NvtResult {
    pub final_state: Configuration,
    /// Production steps performed.
    pub steps: usize,
    /// Steps spent relieving initial clashes.
    pub relief_steps: usize,
    pub energy: f64,
    /// Global step bound of the production integrator at the end.
    pub dl_max: f64,
}

/// Loads the force field and topology named in `config`, attaches the
/// topology to `initial` and runs [`simulate`].
#[instrument(skip_all, name = "nvt_workflow")]
pub fn run(
    initial: Configuration,
    config: &NvtConfig,
    sink: &mut dyn RunSink,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<NvtResult, EngineError> {
    // === Phase 0: Load resources ===
    reporter.report(Progress::PhaseStart {
        name: "Loading Resources",
    });
    info!("Loading force field and topology.");
    let forces = ForceField::load(&config.resources.forcefield_path)?;
    let topology = Topology::load(&config.resources.topology_path)?;
    debug!(
        atom_types = topology.n_atom_types(),
        molecules = topology.n_molecules(),
        "Topology loaded."
    );
    let mut state = initial;
    state.add_topology(topology);
    reporter.report(Progress::PhaseFinish);

    simulate(state, &forces, config, sink, rng, reporter)
}

/// Runs clash relief followed by `config.n_steps` production steps.
pub fn simulate(
    mut state: Configuration,
    forces: &ForceField,
    config: &NvtConfig,
    sink: &mut dyn RunSink,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<NvtResult, EngineError> {
    // === Phase 1: Boundary setup ===
    state.check_resources(Some(forces))?;
    resolve_periodicity(&mut state, config.periodic);
    info!(
        objects = state.n_objects(),
        periodic = state.is_periodic(),
        area = state.area(),
        "Configuration ready."
    );

    let energy = state.energy(forces, config.filter_radius);
    sink.report(&StateReport::capture(&state, config, 0, energy, None))
        .map_err(sink_error)?;

    if state.n_objects() == 0 {
        warn!("Configuration has no objects; skipping the run.");
        reporter.report(Progress::Warning(
            "Configuration has no objects; nothing to sample.".to_string(),
        ));
        sink.finish().map_err(sink_error)?;
        return Ok(NvtResult {
            final_state: state,
            steps: 0,
            relief_steps: 0,
            energy,
            dl_max: 0.0,
        });
    }

    let dl_max = state.width().min(state.height()) / 2.0;
    state.set_all_dl_max(dl_max);

    // === Phase 2: Initial clash relief ===
    let (dl_max, relief_steps) =
        relieve_clashes(&mut state, forces, config, energy, dl_max, rng, reporter)?;
    if relief_steps > 0 {
        let energy = state.energy(forces, config.filter_radius);
        sink.report(&StateReport::capture(
            &state,
            config,
            relief_steps,
            energy,
            None,
        ))
        .map_err(sink_error)?;
    }

    // === Phase 3: Production ===
    reporter.report(Progress::PhaseStart { name: "Production" });
    info!(n_steps = config.n_steps, dl_max, "Starting production run.");
    let production = IntegratorConfig {
        dl_max,
        initial_dl_max: dl_max,
        ..config.integrator.clone()
    };
    let observer = TracingObserver;
    let mut integrator = Integrator::new(forces, production).with_observer(&observer);

    reporter.report(Progress::StepsStart {
        total: config.n_steps as u64,
    });
    let mut done = 0;
    while done < config.n_steps {
        let chunk = next_chunk(
            done,
            config.n_steps,
            config.report_interval,
            config.trajectory_interval,
        );
        integrator.run(
            &mut state,
            config.beta,
            config.pressure,
            chunk,
            config.filter_radius,
            rng,
        );
        done += chunk;
        reporter.steps_done(chunk);

        if done % config.report_interval == 0 {
            let energy = state.energy(forces, config.filter_radius);
            info!(step = done, energy, dl_max = integrator.dl_max, "Progress report.");
            reporter.report(Progress::Energy { step: done, energy });
            sink.report(&StateReport::capture(
                &state,
                config,
                done,
                energy,
                Some(&integrator),
            ))
            .map_err(sink_error)?;
        }
        if let Some(interval) = config.trajectory_interval {
            if done % interval == 0 {
                sink.frame(done, &state).map_err(sink_error)?;
            }
        }
    }
    reporter.report(Progress::StepsFinish);
    reporter.report(Progress::PhaseFinish);
    sink.finish().map_err(sink_error)?;

    let energy = state.energy(forces, config.filter_radius);
    info!(steps = done, energy, "NVT run complete.");
    Ok(NvtResult {
        final_state: state,
        steps: done,
        relief_steps,
        energy,
        dl_max: integrator.dl_max,
    })
}

/// Applies the periodic request. Rectangles take it as given; a polygon is
/// converted to a rectangle when it is one, otherwise the request is ignored.
fn resolve_periodicity(state: &mut Configuration, periodic: bool) {
    if state.is_rectangle() {
        state.set_periodic(periodic);
    } else if periodic {
        if state.poly_2_rect() {
            state.set_periodic(true);
            info!("Polygonal boundary converted to a periodic rectangle.");
        } else {
            warn!(
                "Periodic conditions for non-rectangular configurations are not supported; ignoring the request."
            );
        }
    }
}

/// Runs the sampler in bursts of `2N` steps until the energy drops to
/// `big_energy` or below. Returns the carried step bound and the steps used.
fn relieve_clashes(
    state: &mut Configuration,
    forces: &ForceField,
    config: &NvtConfig,
    mut energy: f64,
    mut dl_max: f64,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<(f64, usize), EngineError> {
    if energy <= forces.big_energy {
        info!("No initial clashes to relieve.");
        return Ok((dl_max, 0));
    }
    reporter.report(Progress::PhaseStart {
        name: "Clash Relief",
    });
    info!(energy, "Relieving initial clashes.");

    let burst = 2 * state.n_objects();
    let limit = RELIEF_STEPS_PER_OBJECT * state.n_objects();
    let mut steps = 0;
    while energy > forces.big_energy {
        if steps > limit {
            warn!(steps, energy, "Clash relief did not converge.");
            return Err(EngineError::Equilibration { steps });
        }
        let relief = IntegratorConfig {
            dl_max,
            ..config.integrator.clone()
        };
        let mut integrator = Integrator::new(forces, relief);
        integrator.run(
            state,
            config.beta,
            config.pressure,
            burst,
            config.filter_radius,
            rng,
        );
        dl_max = integrator.dl_max;
        steps += burst;
        energy = state.energy(forces, config.filter_radius);
        debug!(steps, energy, dl_max, "Relief burst finished.");
    }

    info!(steps, energy, "Initial clashes relieved.");
    reporter.report(Progress::PhaseFinish);
    Ok((dl_max, steps))
}

/// Steps to run from `done` so that the chunk ends at the next report or
/// frame boundary without passing `total`.
fn next_chunk(done: usize, total: usize, report: usize, frame: Option<usize>) -> usize {
    let mut chunk = (total - done).min(report - done % report);
    if let Some(interval) = frame {
        chunk = chunk.min(interval - done % interval);
    }
    chunk
}
