use super::Configuration;
use crate::core::forcefield::params::ForceField;
use crate::core::models::object::Object;
use nalgebra::Point2;

impl Configuration {
    /// Total energy of the configuration.
    ///
    /// Only objects flagged for recalculation are re-evaluated; each sums its
    /// interaction with every other object (nearest image when periodic) and,
    /// against a closed boundary, its wall term. The cached per-object values
    /// count every pair twice, so half their sum is returned.
    ///
    /// With `filter_radius > 0`, pairs whose centres are further apart than
    /// `cut_off + 2 * filter_radius` are skipped without an atom-level
    /// evaluation.
    pub fn energy(&mut self, forces: &ForceField, filter_radius: f64) -> f64 {
        let stale: Vec<usize> = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.needs_recalculation())
            .map(|(i, _)| i)
            .collect();
        if self.unchanged && stale.is_empty() {
            return self.saved_energy / 2.0;
        }

        for index in stale {
            let energy = self.object_energy(forces, index, filter_radius);
            self.objects[index].set_energy(energy);
        }
        self.saved_energy = self.objects.iter().map(Object::energy).sum();
        self.unchanged = true;
        self.saved_energy / 2.0
    }

    fn object_energy(&self, forces: &ForceField, index: usize, filter_radius: f64) -> f64 {
        let object = &self.objects[index];
        let topology = self.topology.as_ref();
        let mut total = 0.0;
        for (j, other) in self.objects.iter().enumerate() {
            if j == index {
                continue;
            }
            let delta = self.displacement(&object.position, &other.position);
            if filter_radius > 0.0 && delta.norm() - 2.0 * filter_radius > forces.cut_off {
                continue;
            }
            let shift = delta - (other.position - object.position);
            total += if shift.x == 0.0 && shift.y == 0.0 {
                object.interaction(forces, topology, other)
            } else {
                object.interaction(forces, topology, &other.image(shift))
            };
        }
        if !self.is_periodic() {
            total += object.box_energy(forces, topology, &self.boundary);
        }
        total
    }

    /// Centre distance beyond which two objects cannot interact.
    pub fn interaction_reach(&self, forces: &ForceField) -> f64 {
        let extent = self.topology.as_ref().map_or(0.0, |t| t.max_extent());
        forces.cut_off + 2.0 * extent
    }

    pub fn invalidate_object(&mut self, index: usize) {
        self.objects[index].mark_stale();
        self.unchanged = false;
    }

    pub fn invalidate_all(&mut self) {
        for object in &mut self.objects {
            object.mark_stale();
        }
        self.unchanged = false;
    }

    /// Marks every object whose centre lies within `distance` of `point` as
    /// stale. Returns how many were marked.
    pub fn invalidate_around(&mut self, point: &Point2<f64>, distance: f64) -> usize {
        let near: Vec<usize> = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| self.displacement(point, &o.position).norm() <= distance)
            .map(|(i, _)| i)
            .collect();
        for &i in &near {
            self.objects[i].mark_stale();
        }
        if !near.is_empty() {
            self.unchanged = false;
        }
        near.len()
    }

    /// Marks object `index` and every object within `distance` of it as stale.
    pub fn invalidate_within(&mut self, index: usize, distance: f64) -> usize {
        let centre = self.objects[index].position;
        self.invalidate_object(index);
        self.invalidate_around(&centre, distance)
    }
}
