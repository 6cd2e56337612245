use super::Configuration;
use super::boundary::Boundary;
use crate::core::geometry::polygon::Polygon;
use crate::core::observe::{MoveObserver, MoveRecord};
use nalgebra::Point2;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::{PI, TAU};

const MOBILITY_FACTOR: f64 = 1.1;
const MOBILITY_FLOOR: f64 = 0.1;
const MIN_ROTATION_SPREAD_DEG: f64 = 1.0;
const MAX_CENTROID_PULLS: usize = 256;

/// Which parts of a move are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveChoice {
    Translate,
    Rotate,
    Both,
}

impl MoveChoice {
    pub fn translates(self) -> bool {
        matches!(self, Self::Translate | Self::Both)
    }

    pub fn rotates(self) -> bool {
        matches!(self, Self::Rotate | Self::Both)
    }
}

/// Exponentially distributed step length with mean 2.
fn exponential_step(rng: &mut impl Rng) -> f64 {
    -2.0 * (1.0 - rng.r#gen::<f64>()).ln()
}

/// Splits `distance` along a uniformly random direction.
fn random_displacement(distance: f64, rng: &mut impl Rng) -> (f64, f64) {
    let angle = rng.r#gen::<f64>() * TAU;
    (distance * angle.sin(), distance * angle.cos())
}

fn wrap_periodic(value: f64, size: f64) -> f64 {
    if size.is_nan() || size <= 0.0 || !value.is_finite() {
        return value;
    }
    let wrapped = value.rem_euclid(size);
    if wrapped >= size { 0.0 } else { wrapped }
}

/// Steps by half the domain until the coordinate is back in `[0, size]`.
/// A coordinate just below zero lands near the middle, not at the edge.
fn step_inside(mut value: f64, size: f64) -> f64 {
    if size.is_nan() || size <= 0.0 || !value.is_finite() {
        return value;
    }
    let step = size / 2.0;
    while value < 0.0 {
        value += step;
    }
    while value > size {
        value -= step;
    }
    value
}

fn pull_toward_centre(polygon: &Polygon, mut point: Point2<f64>) -> Point2<f64> {
    let centre = polygon.center();
    for _ in 0..MAX_CENTROID_PULLS {
        if polygon.is_inside(point.x, point.y) {
            return point;
        }
        point = centre + (point - centre) / 2.0;
    }
    if polygon.is_inside(point.x, point.y) {
        point
    } else {
        centre
    }
}

impl Configuration {
    /// Translates object `index` by an exponential step scaled by `dl_max` in
    /// a random direction and, with `rot_flag`, turns it by a uniform angle in
    /// `[-2pi, 2pi)`. The object is put back inside the boundary and marked
    /// stale.
    pub fn primary_move(
        &mut self,
        index: usize,
        dl_max: f64,
        rot_flag: bool,
        rng: &mut impl Rng,
        observer: &dyn MoveObserver,
    ) {
        let distance = exponential_step(rng) * dl_max;
        let (dx, dy) = random_displacement(distance, rng);
        let angle = if rot_flag {
            rng.r#gen::<f64>() * 2.0 * TAU - TAU
        } else {
            0.0
        };

        let object = &mut self.objects[index];
        object.translate(dx, dy);
        object.stats.n_translation += 1;
        if rot_flag {
            object.rotate(angle);
            object.stats.n_rotation += 1;
        }
        observer.record(&MoveRecord {
            object: index,
            choice: if rot_flag {
                MoveChoice::Both
            } else {
                MoveChoice::Translate
            },
            n_good: object.stats.n_good,
            n_bad: object.stats.n_bad,
            dl_max: object.dl_max,
            dx,
            dy,
            angle,
        });
        self.fix_inbox(index);
        self.invalidate_object(index);
    }

    /// Move driven by the object's own history: the step length uses its
    /// personal `dl_max`, and with `rot_flag` its accept/reject counts decide
    /// between translating, rotating or both (see
    /// [`Configuration::trans_over_rot`]). Rotations follow
    /// [`Configuration::rnd_rotate`].
    pub fn move_after_primary_move(
        &mut self,
        index: usize,
        rot_flag: bool,
        mix_factor: f64,
        rng: &mut impl Rng,
        observer: &dyn MoveObserver,
    ) {
        let distance = exponential_step(rng) * self.objects[index].dl_max;
        let choice = if rot_flag {
            self.trans_over_rot(index, mix_factor, rng)
        } else {
            MoveChoice::Translate
        };

        let (mut dx, mut dy, mut angle) = (0.0, 0.0, 0.0);
        if choice.translates() {
            (dx, dy) = random_displacement(distance, rng);
        }
        if choice.rotates() {
            angle = self.rnd_rotate(index, rng);
        }

        let object = &mut self.objects[index];
        if choice.translates() {
            object.translate(dx, dy);
            object.stats.n_translation += 1;
        }
        if choice.rotates() {
            object.rotate(angle);
            object.stats.n_rotation += 1;
        }
        observer.record(&MoveRecord {
            object: index,
            choice,
            n_good: object.stats.n_good,
            n_bad: object.stats.n_bad,
            dl_max: object.dl_max,
            dx,
            dy,
            angle,
        });
        self.fix_inbox(index);
        self.invalidate_object(index);
    }

    /// Draws an integer uniformly from `[-n_bad, n_good]`. Values at or above
    /// `-n_bad * mix_factor` allow a translation and values at or below
    /// `n_good * mix_factor` allow a rotation, so successful objects lean
    /// towards translating and stuck ones towards rotating.
    pub fn trans_over_rot(&self, index: usize, mix_factor: f64, rng: &mut impl Rng) -> MoveChoice {
        let stats = self.objects[index].stats;
        let n_good = stats.n_good as i64;
        let n_bad = stats.n_bad as i64;
        let draw = rng.gen_range(-n_bad..=n_good) as f64;
        let translate = draw >= -(n_bad as f64) * mix_factor;
        let rotate = draw <= n_good as f64 * mix_factor;
        match (translate, rotate) {
            (true, false) => MoveChoice::Translate,
            (false, true) => MoveChoice::Rotate,
            _ => MoveChoice::Both,
        }
    }

    /// Rotation angle in radians, normally distributed around a random
    /// multiple of `360 / symmetry` degrees. The spread narrows as the
    /// object's success ratio grows, never below one degree.
    pub fn rnd_rotate(&self, index: usize, rng: &mut impl Rng) -> f64 {
        let symmetry = self.symmetry(index).max(1);
        let sector = 360.0 / symmetry as f64;
        let k = rng.gen_range(0..=symmetry) as f64;
        let ratio = self.objects[index].stats.success_ratio();
        let spread = (sector * (1.0 - ratio)).max(MIN_ROTATION_SPREAD_DEG);
        let z: f64 = rng.sample(StandardNormal);
        (k * sector + spread * z).to_radians()
    }

    /// Records the outcome of a move on object `index`. Acceptance grows its
    /// step bound by 10% up to `ceiling`; rejection shrinks it by 10% down to
    /// 0.1.
    pub fn modify_mobility(&mut self, index: usize, accepted: bool, ceiling: f64) {
        let object = &mut self.objects[index];
        if accepted {
            object.stats.n_good += 1;
            object.dl_max = (object.dl_max * MOBILITY_FACTOR).min(ceiling);
        } else {
            object.stats.n_bad += 1;
            object.dl_max = (object.dl_max / MOBILITY_FACTOR).max(MOBILITY_FLOOR);
        }
    }

    /// Turns object `index` by a uniform angle in `[-theta_max/2, theta_max/2)`.
    pub fn rotate_object(&mut self, index: usize, theta_max: f64, rng: &mut impl Rng) {
        let angle = rng.r#gen::<f64>() * theta_max - theta_max / 2.0;
        self.objects[index].rotate(angle);
        self.invalidate_object(index);
    }

    /// Brings the centre of object `index` back inside the boundary.
    ///
    /// Periodic rectangles wrap into `[0, x_size) x [0, y_size)`. Closed
    /// rectangles step the coordinate by half the side until it is in range.
    /// Polygons pull the point halfway toward the centroid until it is inside.
    pub fn fix_inbox(&mut self, index: usize) {
        let position = self.objects[index].position;
        let fixed = match &self.boundary {
            Boundary::Rectangle {
                x_size,
                y_size,
                periodic: true,
            } => Point2::new(
                wrap_periodic(position.x, *x_size),
                wrap_periodic(position.y, *y_size),
            ),
            Boundary::Rectangle {
                x_size,
                y_size,
                periodic: false,
            } => Point2::new(
                step_inside(position.x, *x_size),
                step_inside(position.y, *y_size),
            ),
            Boundary::Polygon(polygon) => pull_toward_centre(polygon, position),
        };
        self.objects[index].position = fixed;
    }

    /// Gives every clashing object a random kick and a random turn in
    /// `[-pi, pi)`.
    pub fn jiggle(&mut self, rng: &mut impl Rng) {
        let mut moved = false;
        for index in 0..self.objects.len() {
            if !self.has_clash(index) {
                continue;
            }
            let (dx, dy) = random_displacement(exponential_step(rng), rng);
            self.objects[index].translate(dx, dy);
            self.fix_inbox(index);
            let angle = rng.r#gen::<f64>() * TAU - PI;
            self.objects[index].rotate(angle);
            moved = true;
        }
        if moved {
            self.invalidate_all();
        }
    }
}
