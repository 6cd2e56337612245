//! # Configuration Module
//!
//! A [`Configuration`] is the complete simulated state: the boundary, the
//! ordered list of objects, an optional topology describing what the objects
//! are made of, and the cached total energy.
//!
//! Operations are grouped by concern:
//!
//! - [`boundary`] - Boundary geometry, expansion, rectangle/polygon conversion and convex hulls
//! - [`energy`] - Cached energy evaluation and neighbour invalidation
//! - `clash` - Atom-level overlap tests
//! - [`moves`] - Random move primitives, adaptive mobility and boundary enforcement
//!
//! Every mutating operation leaves each object inside the boundary.

pub mod boundary;
mod clash;
pub mod energy;
pub mod moves;

use crate::core::geometry::planar::nearest_image_shift;
use crate::core::models::object::{MobilityStats, Object};
use crate::core::models::topology::Topology;
use boundary::Boundary;
use crate::core::forcefield::params::ForceField;
use nalgebra::Point2;
use std::io::{self, Write};
use thiserror::Error;

const DEFAULT_SYMMETRY: u32 = 4;

/// Disagreement between a configuration, its topology and a force field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceMismatch {
    #[error("Topology defines {n_atom_types} atom types but the force field only has {type_max}")]
    AtomTypes { n_atom_types: usize, type_max: usize },
    #[error("Object {index} has type {object_type}, but the topology defines {n_molecules} molecules")]
    UndefinedMolecule {
        index: usize,
        object_type: usize,
        n_molecules: usize,
    },
    #[error("Object {index} has type {object_type}, but the force field only has {type_max} atom types")]
    UndefinedAtomType {
        index: usize,
        object_type: usize,
        type_max: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    boundary: Boundary,
    objects: Vec<Object>,
    topology: Option<Topology>,
    saved_energy: f64,
    unchanged: bool,
}

impl Configuration {
    pub fn new(boundary: Boundary) -> Self {
        Self::with_objects(boundary, Vec::new())
    }

    pub fn with_objects(boundary: Boundary, objects: Vec<Object>) -> Self {
        Self {
            boundary,
            objects,
            topology: None,
            saved_energy: 0.0,
            unchanged: false,
        }
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn is_periodic(&self) -> bool {
        self.boundary.is_periodic()
    }

    pub fn is_rectangle(&self) -> bool {
        self.boundary.is_rectangle()
    }

    /// Turns periodic conditions on or off. Only rectangles can be periodic;
    /// returns whether the request was applied.
    pub fn set_periodic(&mut self, periodic: bool) -> bool {
        let changed = match &mut self.boundary {
            Boundary::Rectangle { periodic: p, .. } => {
                let changed = *p != periodic;
                *p = periodic;
                changed
            }
            Boundary::Polygon(_) => return !periodic,
        };
        if changed {
            self.invalidate_all();
        }
        true
    }

    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    /// Attaches a topology, replacing any previous one.
    pub fn add_topology(&mut self, topology: Topology) {
        self.topology = Some(topology);
        self.invalidate_all();
    }

    pub fn n_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Panics when `index` is out of range.
    pub fn object(&self, index: usize) -> &Object {
        &self.objects[index]
    }

    pub(crate) fn object_mut(&mut self, index: usize) -> &mut Object {
        &mut self.objects[index]
    }

    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
        self.unchanged = false;
    }

    /// Checks that every object type has a molecule in the attached topology
    /// and, given `forces`, that every atom type it can produce has a radius
    /// there. Objects without a topology are single atoms of their own type.
    pub fn check_resources(&self, forces: Option<&ForceField>) -> Result<(), ResourceMismatch> {
        if let (Some(topology), Some(forces)) = (&self.topology, forces) {
            if topology.n_atom_types() > forces.type_max() {
                return Err(ResourceMismatch::AtomTypes {
                    n_atom_types: topology.n_atom_types(),
                    type_max: forces.type_max(),
                });
            }
        }
        for (index, object) in self.objects.iter().enumerate() {
            let object_type = object.object_type;
            match (&self.topology, forces) {
                (Some(topology), _) if object_type >= topology.n_molecules() => {
                    return Err(ResourceMismatch::UndefinedMolecule {
                        index,
                        object_type,
                        n_molecules: topology.n_molecules(),
                    });
                }
                (None, Some(forces)) if object_type >= forces.type_max() => {
                    return Err(ResourceMismatch::UndefinedAtomType {
                        index,
                        object_type,
                        type_max: forces.type_max(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Highest object type present, `None` without objects.
    pub fn object_types(&self) -> Option<usize> {
        self.objects.iter().map(|o| o.object_type).max()
    }

    pub fn stats(&self, index: usize) -> MobilityStats {
        self.objects[index].stats
    }

    pub fn set_object_dl_max(&mut self, index: usize, dl_max: f64) {
        self.objects[index].dl_max = dl_max;
    }

    pub fn set_all_dl_max(&mut self, dl_max: f64) {
        for object in &mut self.objects {
            object.dl_max = dl_max;
        }
    }

    pub fn area(&self) -> f64 {
        self.boundary.area()
    }

    pub fn width(&self) -> f64 {
        self.boundary.width()
    }

    pub fn height(&self) -> f64 {
        self.boundary.height()
    }

    /// Number of objects per unit area.
    pub fn density(&self) -> f64 {
        self.n_objects() as f64 / self.area()
    }

    /// Rotational symmetry order of an object, from its molecule when a
    /// topology is attached.
    pub fn symmetry(&self, index: usize) -> u32 {
        self.topology
            .as_ref()
            .map(|t| t.symmetry(self.objects[index].object_type))
            .unwrap_or(DEFAULT_SYMMETRY)
    }

    /// Whether the cached total energy is current.
    pub fn is_unchanged(&self) -> bool {
        self.unchanged
    }

    pub fn mark_changed(&mut self) {
        self.unchanged = false;
    }

    /// Displacement from `from` to `to`, using the nearest image when periodic.
    pub(crate) fn displacement(&self, from: &Point2<f64>, to: &Point2<f64>) -> nalgebra::Vector2<f64> {
        let mut delta = to - from;
        if let Boundary::Rectangle {
            x_size,
            y_size,
            periodic: true,
        } = self.boundary
        {
            delta.x += nearest_image_shift(delta.x, x_size);
            delta.y += nearest_image_shift(delta.y, y_size);
        }
        delta
    }

    /// Atom centres of an object, or its centre without a topology.
    pub(crate) fn atom_positions(&self, object: &Object) -> Vec<Point2<f64>> {
        match &self.topology {
            Some(topology) => object.atoms(topology).map(|a| a.position).collect(),
            None => vec![object.position],
        }
    }

    /// Writes the boundary header, the object count and one line per object.
    pub fn write(&self, writer: &mut impl Write) -> io::Result<()> {
        match &self.boundary {
            Boundary::Rectangle { x_size, y_size, .. } => {
                writeln!(writer, "{:9.6} {:9.6} ", x_size, y_size)?
            }
            Boundary::Polygon(polygon) => {
                writeln!(writer, "{:9.6} {:9.6} ", 0.0, 0.0)?;
                polygon.write(writer)?;
            }
        }
        writeln!(writer, "{}", self.objects.len())?;
        for object in &self.objects {
            object.write(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn periodic_box(size: f64, positions: &[(f64, f64)]) -> Configuration {
        let objects = positions
            .iter()
            .map(|&(x, y)| Object::new(0, x, y, 0.0))
            .collect();
        Configuration::with_objects(Boundary::rectangle(size, size, true), objects)
    }

    pub fn closed_box(size: f64, positions: &[(f64, f64)]) -> Configuration {
        let mut state = periodic_box(size, positions);
        state.set_periodic(false);
        state
    }
}
