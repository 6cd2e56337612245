use crate::core::configuration::boundary::Boundary;
use crate::core::forcefield::params::ForceField;
use crate::core::geometry::planar::{nearest_image_shift, rotate_offset};
use crate::core::models::topology::Topology;
use nalgebra::{Point2, Vector2};
use std::io::{self, Write};

/// Lifetime move statistics of one object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobilityStats {
    pub n_good: u64,
    pub n_bad: u64,
    pub n_rotation: u64,
    pub n_translation: u64,
}

impl MobilityStats {
    pub fn attempts(&self) -> u64 {
        self.n_good + self.n_bad
    }

    /// Fraction of accepted moves, zero before the first attempt.
    pub fn success_ratio(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            n => self.n_good as f64 / n as f64,
        }
    }
}

/// An atom of an object placed in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedAtom<'a> {
    pub atom_type: usize,
    pub position: Point2<f64>,
    pub radius: f64,
    /// Per-atom color override from the topology.
    pub color: Option<&'a str>,
}

impl<'a> PlacedAtom<'a> {
    pub fn display_color<'f>(&self, forces: &'f ForceField) -> &'f str
    where
        'a: 'f,
    {
        self.color.unwrap_or_else(|| forces.color(self.atom_type))
    }
}

/// One rigid body: a pose, an adaptive step bound and a cached energy.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub object_type: usize,
    pub position: Point2<f64>,
    pub orientation: f64,
    pub stats: MobilityStats,
    pub dl_max: f64,
    recalculate: bool,
    energy: f64,
}

impl Object {
    pub fn new(object_type: usize, x: f64, y: f64, orientation: f64) -> Self {
        Self {
            object_type,
            position: Point2::new(x, y),
            orientation,
            stats: MobilityStats::default(),
            dl_max: 1.0,
            recalculate: true,
            energy: 0.0,
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.position += Vector2::new(dx, dy);
    }

    pub fn rotate(&mut self, angle: f64) {
        self.orientation += angle;
    }

    /// Scales the position about the origin. Orientation is unchanged.
    pub fn expand(&mut self, factor: f64) {
        self.position.coords *= factor;
    }

    pub fn needs_recalculation(&self) -> bool {
        self.recalculate
    }

    pub fn mark_stale(&mut self) {
        self.recalculate = true;
    }

    /// Cached energy; meaningful only while the object is not stale.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn set_energy(&mut self, energy: f64) {
        self.energy = energy;
        self.recalculate = false;
    }

    /// Copy of this object shifted by `offset`, used for periodic images.
    pub fn image(&self, offset: Vector2<f64>) -> Self {
        let mut image = self.clone();
        image.position += offset;
        image
    }

    /// Atoms of the molecule for this object type, rotated and placed.
    pub fn atoms<'a>(
        &self,
        topology: &'a Topology,
    ) -> impl Iterator<Item = PlacedAtom<'a>> + use<'a> {
        let position = self.position;
        let orientation = self.orientation;
        topology
            .molecule(self.object_type)
            .atoms
            .iter()
            .map(move |atom| PlacedAtom {
                atom_type: atom.atom_type,
                position: position + rotate_offset(&Vector2::new(atom.x, atom.y), orientation),
                radius: topology.atom_size(atom.atom_type),
                color: atom.color.as_deref(),
            })
    }

    /// Interaction sites used for energies. Without a topology the object is
    /// a single atom of its own type on its centre.
    pub fn sites<'a>(
        &self,
        forces: &ForceField,
        topology: Option<&'a Topology>,
    ) -> Vec<PlacedAtom<'a>> {
        match topology {
            Some(topology) => self.atoms(topology).collect(),
            None => {
                let atom_type = self.object_type;
                vec![PlacedAtom {
                    atom_type,
                    position: self.position,
                    radius: forces.size(atom_type),
                    color: None,
                }]
            }
        }
    }

    /// Pair energy with `other`, symmetric under exchange of the two objects.
    ///
    /// Each atom pair is evaluated from both sides, since the potential
    /// depends on the color of its first atom, and the two sums averaged.
    pub fn interaction(
        &self,
        forces: &ForceField,
        topology: Option<&Topology>,
        other: &Object,
    ) -> f64 {
        let mine = self.sites(forces, topology);
        let theirs = other.sites(forces, topology);
        let mut forward = 0.0;
        let mut backward = 0.0;
        for a in &mine {
            let color_a = a.display_color(forces);
            for b in &theirs {
                let r = nalgebra::distance(&a.position, &b.position);
                forward += forces.interaction(a.atom_type, b.atom_type, color_a, r);
                backward +=
                    forces.interaction(b.atom_type, a.atom_type, b.display_color(forces), r);
            }
        }
        0.5 * (forward + backward)
    }

    /// Wall penalty summed over atoms against a closed boundary.
    pub fn box_energy(
        &self,
        forces: &ForceField,
        topology: Option<&Topology>,
        boundary: &Boundary,
    ) -> f64 {
        self.sites(forces, topology)
            .iter()
            .map(|site| {
                let distance = boundary.signed_wall_distance(&site.position);
                forces.wall_interaction(site.atom_type, distance)
            })
            .sum()
    }

    /// Centre-to-centre distance, using the nearest image when periodic.
    pub fn distance(&self, other: &Object, x_size: f64, y_size: f64, periodic: bool) -> f64 {
        let mut delta = other.position - self.position;
        if periodic {
            delta.x += nearest_image_shift(delta.x, x_size);
            delta.y += nearest_image_shift(delta.y, y_size);
        }
        delta.norm()
    }

    /// Writes `type x y orientation` on one line.
    pub fn write(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(
            writer,
            "{} {:9.6} {:9.6} {:9.6}",
            self.object_type, self.position.x, self.position.y, self.orientation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::polygon::Polygon;
    use crate::core::models::topology::{AtomType, Molecule, MoleculeAtom};
    use std::f64::consts::FRAC_PI_2;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn rod() -> Topology {
        Topology::new(
            vec![
                AtomType {
                    radius: 0.5,
                    color: "red".into(),
                },
                AtomType {
                    radius: 0.5,
                    color: "green".into(),
                },
            ],
            vec![Molecule {
                symmetry: 2,
                atoms: vec![
                    MoleculeAtom {
                        atom_type: 0,
                        x: 1.0,
                        y: 0.0,
                        color: None,
                    },
                    MoleculeAtom {
                        atom_type: 1,
                        x: -1.0,
                        y: 0.0,
                        color: Some("green".into()),
                    },
                ],
            }],
        )
        .unwrap()
    }

    #[test]
    fn success_ratio_is_zero_without_attempts() {
        let stats = MobilityStats::default();
        assert_eq!(stats.success_ratio(), 0.0);
        let stats = MobilityStats {
            n_good: 3,
            n_bad: 1,
            ..Default::default()
        };
        assert_eq!(stats.attempts(), 4);
        assert!(f64_approx_equal(stats.success_ratio(), 0.75));
    }

    #[test]
    fn atoms_follow_orientation() {
        let topology = rod();
        let object = Object::new(0, 5.0, 5.0, FRAC_PI_2);
        let atoms: Vec<_> = object.atoms(&topology).collect();
        assert_eq!(atoms.len(), 2);
        assert!(f64_approx_equal(atoms[0].position.x, 5.0));
        assert!(f64_approx_equal(atoms[0].position.y, 6.0));
        assert!(f64_approx_equal(atoms[1].position.y, 4.0));
        assert_eq!(atoms[1].color, Some("green"));
    }

    #[test]
    fn expand_scales_position_but_keeps_orientation() {
        let mut object = Object::new(0, 1.0, 2.0, 0.3);
        object.expand(2.5);
        assert!(f64_approx_equal(object.x(), 2.5));
        assert!(f64_approx_equal(object.y(), 5.0));
        assert_eq!(object.orientation, 0.3);
    }

    #[test]
    fn set_energy_clears_stale_flag() {
        let mut object = Object::new(0, 0.0, 0.0, 0.0);
        assert!(object.needs_recalculation());
        object.set_energy(4.0);
        assert!(!object.needs_recalculation());
        assert_eq!(object.energy(), 4.0);
        object.mark_stale();
        assert!(object.needs_recalculation());
    }

    #[test]
    fn interaction_is_symmetric_with_color_dependent_potential() {
        let mut forces = ForceField::repulsive(0.5);
        forces
            .update_from(&mut std::io::Cursor::new(
                "2\n0.5 0.5\nred green\n4.0 2.0 0.8\n-1.0 -0.5\n-0.5 -2.0\n",
            ))
            .unwrap();
        let topology = rod();
        let a = Object::new(0, 0.0, 0.0, 0.0);
        let b = Object::new(0, 2.6, 1.1, 0.7);
        let ab = a.interaction(&forces, Some(&topology), &b);
        let ba = b.interaction(&forces, Some(&topology), &a);
        assert!(ab != 0.0);
        assert!((ab - ba).abs() < 1e-9 * (1.0 + ab.abs()));
    }

    #[test]
    fn interaction_without_topology_uses_object_centres() {
        let forces = ForceField::repulsive(0.6);
        let a = Object::new(0, 0.0, 0.0, 0.0);
        let b = Object::new(0, 1.0, 0.0, 0.0);
        let energy = a.interaction(&forces, None, &b);
        assert!(energy >= forces.big_energy);
    }

    #[test]
    fn distance_uses_nearest_image_when_periodic() {
        let a = Object::new(0, 0.5, 5.0, 0.0);
        let b = Object::new(0, 9.5, 5.0, 0.0);
        assert!(f64_approx_equal(a.distance(&b, 10.0, 10.0, false), 9.0));
        assert!(f64_approx_equal(a.distance(&b, 10.0, 10.0, true), 1.0));
    }

    #[test]
    fn box_energy_penalizes_atoms_near_walls() {
        let forces = ForceField::repulsive(0.5);
        let boundary = Boundary::Rectangle {
            x_size: 10.0,
            y_size: 10.0,
            periodic: false,
        };
        let inside = Object::new(0, 5.0, 5.0, 0.0);
        let touching = Object::new(0, 0.25, 5.0, 0.0);
        assert_eq!(inside.box_energy(&forces, None, &boundary), 0.0);
        assert!(touching.box_energy(&forces, None, &boundary) > forces.big_energy);

        let polygon = Boundary::Polygon(Polygon::rectangle(10.0, 10.0));
        assert!(touching.box_energy(&forces, None, &polygon) > forces.big_energy);
    }

    #[test]
    fn write_emits_type_position_and_orientation() {
        let mut buffer = Vec::new();
        Object::new(2, 1.5, 2.25, 0.5).write(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let fields: Vec<_> = text.split_whitespace().collect();
        assert_eq!(fields, ["2", "1.500000", "2.250000", "0.500000"]);
    }
}
