use super::config::IntegratorConfig;
use super::policy::MovePolicy;
use crate::core::configuration::Configuration;
use crate::core::forcefield::params::ForceField;
use crate::core::observe::{MoveObserver, NullObserver};
use rand::Rng;
use tracing::{debug, instrument, warn};

const LOW_ACCEPTANCE: f64 = 0.1;
const HIGH_ACCEPTANCE: f64 = 0.7;
const SHRINK_FACTOR: f64 = 3.9;
const GROW_FACTOR: f64 = 3.0;
const MIN_STEP_BOUND: f64 = 0.1;

/// Probability of accepting a change of energy `delta_u` at inverse
/// temperature `beta`: `min(1, exp(-beta * delta_u))`.
pub fn acceptance_probability(beta: f64, delta_u: f64) -> f64 {
    if beta == 0.0 || delta_u <= 0.0 {
        1.0
    } else {
        (-beta * delta_u).exp().min(1.0)
    }
}

/// Metropolis sampler over a [`Configuration`].
///
/// Each step clones the current state, moves one random object in the clone
/// and keeps whichever of the two the Metropolis criterion selects. The
/// integrator tunes its global step bound from its running acceptance tallies
/// and leaves per-object bounds and statistics on the configuration.
pub struct Integrator<'a> {
    forces: &'a ForceField,
    observer: &'a dyn MoveObserver,
    config: IntegratorConfig,
    pub dl_max: f64,
    pub initial_dl_max: f64,
    pub n_good: u64,
    pub n_bad: u64,
    n_step: usize,
}

impl<'a> Integrator<'a> {
    pub fn new(forces: &'a ForceField, config: IntegratorConfig) -> Self {
        Self {
            forces,
            observer: &NullObserver,
            dl_max: config.dl_max,
            initial_dl_max: config.initial_dl_max,
            config,
            n_good: 0,
            n_bad: 0,
            n_step: 0,
        }
    }

    /// Reports every proposed move to `observer`.
    pub fn with_observer(mut self, observer: &'a dyn MoveObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Steps performed over the integrator's lifetime.
    pub fn n_step(&self) -> usize {
        self.n_step
    }

    /// Accepted fraction since the last recalibration, if any move was made.
    pub fn acceptance_ratio(&self) -> Option<f64> {
        match self.n_good + self.n_bad {
            0 => None,
            n => Some(self.n_good as f64 / n as f64),
        }
    }

    /// Rescales the global step bound from the running acceptance ratio,
    /// clips it to `[0.1, min(width, height)]` and resets the tallies.
    pub fn adjust_step_bound(&mut self, width: f64, height: f64) {
        if let Some(ratio) = self.acceptance_ratio() {
            if ratio < LOW_ACCEPTANCE {
                self.dl_max /= SHRINK_FACTOR;
            } else if ratio > HIGH_ACCEPTANCE {
                self.dl_max *= GROW_FACTOR;
            }
        }
        self.dl_max = self.dl_max.min(width).min(height).max(MIN_STEP_BOUND);
        debug!(
            dl_max = self.dl_max,
            n_good = self.n_good,
            n_bad = self.n_bad,
            "Adjusted global step bound."
        );
        self.n_good = 0;
        self.n_bad = 0;
    }

    /// Performs `n_steps` Metropolis steps on `state` and returns the total
    /// number of steps this integrator has made.
    ///
    /// `pressure` is accepted for parity with other ensembles and unused.
    /// `filter_radius` is forwarded to [`Configuration::energy`].
    #[instrument(skip_all, name = "integrator_run", fields(n_steps = n_steps, beta = beta, pressure = pressure))]
    pub fn run(
        &mut self,
        state: &mut Configuration,
        beta: f64,
        pressure: f64,
        n_steps: usize,
        filter_radius: f64,
        rng: &mut impl Rng,
    ) -> usize {
        let n_objects = state.n_objects();
        if n_objects == 0 {
            warn!("Configuration has no objects; nothing to integrate.");
            return self.n_step;
        }

        for _ in 0..n_steps {
            if self.n_step > 0 && self.n_step % self.config.i_adjust == 0 {
                self.adjust_step_bound(state.width(), state.height());
            }
            if self.n_step > 0 && self.n_step % self.config.mobility_reset_interval == 0 {
                state.set_all_dl_max(self.initial_dl_max);
            }

            let mut candidate = state.clone();
            let index = rng.gen_range(0..n_objects);
            let previous = state.object(index).position;

            match MovePolicy::for_object(&state.stats(index), self.config.n_try) {
                MovePolicy::Bootstrap => candidate.primary_move(
                    index,
                    self.dl_max,
                    self.config.rot_flag,
                    rng,
                    self.observer,
                ),
                MovePolicy::Adaptive => candidate.move_after_primary_move(
                    index,
                    self.config.rot_flag,
                    self.config.move_mix_factor,
                    rng,
                    self.observer,
                ),
            }

            let reach = candidate.interaction_reach(self.forces);
            candidate.invalidate_within(index, reach);
            candidate.invalidate_around(&previous, reach);
            candidate.mark_changed();

            let delta_u = candidate.energy(self.forces, filter_radius)
                - state.energy(self.forces, filter_radius);
            let probability = acceptance_probability(beta, delta_u);
            let accepted = probability >= 1.0 || rng.r#gen::<f64>() < probability;

            if accepted {
                self.n_good += 1;
                *state = candidate;
                state.modify_mobility(index, true, self.initial_dl_max);
            } else {
                self.n_bad += 1;
                state.modify_mobility(index, false, self.initial_dl_max);
            }
            self.n_step += 1;
        }
        self.n_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::configuration::boundary::Boundary;
    use crate::core::configuration::moves::MoveChoice;
    use crate::core::models::object::Object;
    use crate::core::models::topology::Topology;
    use crate::core::observe::testing::RecordingObserver;
    use crate::engine::config::IntegratorConfigBuilder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE * (1.0 + a.abs().max(b.abs()))
    }

    fn lattice(size: f64, n_side: usize, periodic: bool) -> Configuration {
        let spacing = size / n_side as f64;
        let mut objects = Vec::new();
        for i in 0..n_side {
            for j in 0..n_side {
                objects.push(Object::new(
                    0,
                    (i as f64 + 0.5) * spacing,
                    (j as f64 + 0.5) * spacing,
                    0.0,
                ));
            }
        }
        let mut state =
            Configuration::with_objects(Boundary::rectangle(size, size, periodic), objects);
        state.add_topology(Topology::single_disc(0.5, "red"));
        state
    }

    #[test]
    fn acceptance_is_certain_for_downhill_moves() {
        assert_eq!(acceptance_probability(1.0, -3.0), 1.0);
        assert_eq!(acceptance_probability(1.0, 0.0), 1.0);
        assert_eq!(acceptance_probability(0.0, 1e9), 1.0);
    }

    #[test]
    fn acceptance_strictly_decreases_with_energy_increase() {
        let mut previous = 1.0;
        for step in 1..20 {
            let p = acceptance_probability(0.5, step as f64 * 0.25);
            assert!(p < previous);
            assert!(p > 0.0);
            previous = p;
        }
    }

    #[test]
    fn infinite_temperature_accepts_every_move() {
        let forces = ForceField::repulsive(0.5);
        let mut state = lattice(10.0, 3, true);
        let mut integrator = Integrator::new(&forces, IntegratorConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let steps = integrator.run(&mut state, 0.0, 1.0, 100, 0.0, &mut rng);
        assert_eq!(steps, 100);
        assert_eq!(integrator.n_good, 100);
        assert_eq!(integrator.n_bad, 0);
        let total_good: u64 = (0..state.n_objects()).map(|i| state.stats(i).n_good).sum();
        assert_eq!(total_good, 100);
    }

    #[test]
    fn low_acceptance_shrinks_step_bound_by_fixed_factor() {
        let forces = ForceField::repulsive(0.5);
        let mut integrator = Integrator::new(&forces, IntegratorConfig::default());
        integrator.dl_max = 2.0;
        integrator.n_good = 5;
        integrator.n_bad = 95;
        integrator.adjust_step_bound(10.0, 10.0);
        assert!(f64_approx_equal(integrator.dl_max, 2.0 / 3.9));
        assert_eq!((integrator.n_good, integrator.n_bad), (0, 0));

        integrator.dl_max = 0.3;
        integrator.n_good = 1;
        integrator.n_bad = 19;
        integrator.adjust_step_bound(10.0, 10.0);
        assert_eq!(integrator.dl_max, 0.1);
    }

    #[test]
    fn high_acceptance_grows_step_bound_up_to_box() {
        let forces = ForceField::repulsive(0.5);
        let mut integrator = Integrator::new(&forces, IntegratorConfig::default());
        integrator.dl_max = 2.0;
        integrator.n_good = 80;
        integrator.n_bad = 20;
        integrator.adjust_step_bound(5.0, 4.0);
        assert_eq!(integrator.dl_max, 4.0);
    }

    #[test]
    fn run_recalibrates_every_i_adjust_steps() {
        let forces = ForceField::repulsive(0.5);
        let config = IntegratorConfigBuilder::new().i_adjust(10).build().unwrap();
        let mut state = lattice(100.0, 2, true);
        let mut integrator = Integrator::new(&forces, config);
        integrator.run(&mut state, 0.0, 1.0, 11, 0.0, &mut StdRng::seed_from_u64(2));
        assert!(f64_approx_equal(integrator.dl_max, 3.0));
        assert_eq!(integrator.n_good, 1);
    }

    #[test]
    fn personal_bounds_reset_on_schedule() {
        let forces = ForceField::repulsive(0.5);
        let config = IntegratorConfigBuilder::new()
            .mobility_reset_interval(5)
            .initial_dl_max(0.7)
            .build()
            .unwrap();
        let mut state = lattice(10.0, 2, true);
        state.set_all_dl_max(0.2);
        let mut integrator = Integrator::new(&forces, config);
        integrator.run(&mut state, 0.0, 1.0, 6, 0.0, &mut StdRng::seed_from_u64(3));
        assert!(state.objects().iter().all(|o| o.dl_max == 0.7));
    }

    #[test]
    fn cached_energy_stays_exact_through_a_run() {
        let forces = ForceField::repulsive(0.5);
        let mut state = lattice(6.0, 4, false);
        let config = IntegratorConfigBuilder::new()
            .rot_flag(true)
            .n_try(20)
            .build()
            .unwrap();
        let mut integrator = Integrator::new(&forces, config);
        integrator.run(&mut state, 1.0, 1.0, 400, 0.0, &mut StdRng::seed_from_u64(4));

        let cached = state.energy(&forces, 0.0);
        let mut fresh = state.clone();
        fresh.invalidate_all();
        assert!(f64_approx_equal(cached, fresh.energy(&forces, 0.0)));
    }

    #[test]
    fn bootstrap_moves_use_global_bound_and_free_rotation() {
        let forces = ForceField::repulsive(0.5);
        let config = IntegratorConfigBuilder::new()
            .rot_flag(true)
            .n_try(1_000)
            .build()
            .unwrap();
        let observer = RecordingObserver::default();
        let mut state = lattice(10.0, 2, true);
        let mut integrator = Integrator::new(&forces, config).with_observer(&observer);
        integrator.run(&mut state, 0.0, 1.0, 20, 0.0, &mut StdRng::seed_from_u64(5));
        let records = observer.records.borrow();
        assert_eq!(records.len(), 20);
        assert!(records.iter().all(|r| r.choice == MoveChoice::Both));
    }

    #[test]
    fn adaptive_moves_without_rotation_only_translate() {
        let forces = ForceField::repulsive(0.5);
        let config = IntegratorConfigBuilder::new().n_try(0).build().unwrap();
        let observer = RecordingObserver::default();
        let mut state = lattice(10.0, 2, true);
        let mut integrator = Integrator::new(&forces, config).with_observer(&observer);
        integrator.run(&mut state, 0.0, 1.0, 20, 0.0, &mut StdRng::seed_from_u64(6));
        assert!(
            observer
                .records
                .borrow()
                .iter()
                .all(|r| r.choice == MoveChoice::Translate)
        );
        assert!(state.objects().iter().all(|o| o.stats.n_rotation == 0));
    }

    #[test]
    fn empty_configuration_is_left_alone() {
        let forces = ForceField::repulsive(0.5);
        let mut state = Configuration::new(Boundary::rectangle(5.0, 5.0, true));
        let mut integrator = Integrator::new(&forces, IntegratorConfig::default());
        assert_eq!(
            integrator.run(&mut state, 1.0, 1.0, 50, 0.0, &mut StdRng::seed_from_u64(7)),
            0
        );
    }
}
