use super::Configuration;
use super::boundary::Boundary;
use crate::core::models::object::Object;

/// Brings an atom separation onto the periodic image that can touch when the
/// atoms sit near opposite edges.
fn contact_image(delta: f64, reach: f64, size: f64) -> f64 {
    if delta > size - reach {
        delta - size
    } else if delta < reach - size {
        delta + size
    } else {
        delta
    }
}

impl Configuration {
    /// Whether any atom of `a` overlaps any atom of `b`. Without a topology
    /// two objects clash only when their centres coincide.
    fn objects_clash(&self, a: &Object, b: &Object) -> bool {
        let Some(topology) = &self.topology else {
            return a.position == b.position;
        };
        let period = match self.boundary {
            Boundary::Rectangle {
                x_size,
                y_size,
                periodic: true,
            } => Some((x_size, y_size)),
            _ => None,
        };
        for atom_a in a.atoms(topology) {
            for atom_b in b.atoms(topology) {
                let reach = atom_a.radius + atom_b.radius;
                let mut delta = atom_b.position - atom_a.position;
                if let Some((x_size, y_size)) = period {
                    delta.x = contact_image(delta.x, reach, x_size);
                    delta.y = contact_image(delta.y, reach, y_size);
                }
                if delta.norm_squared() < reach * reach {
                    return true;
                }
            }
        }
        false
    }

    /// Whether object `index` clashes with any other object.
    pub fn has_clash(&self, index: usize) -> bool {
        let object = &self.objects[index];
        self.objects
            .iter()
            .enumerate()
            .any(|(j, other)| j != index && self.objects_clash(object, other))
    }

    /// Whether any pair of objects clashes.
    pub fn has_clashes(&self) -> bool {
        self.objects.iter().enumerate().any(|(i, a)| {
            self.objects[i + 1..]
                .iter()
                .any(|b| self.objects_clash(a, b))
        })
    }

    /// Whether `candidate` could not be added: an atom crosses a closed
    /// boundary or overlaps an existing object.
    pub fn insertion_clashes(&self, candidate: &Object) -> bool {
        if !self.is_periodic() {
            let outside = match &self.topology {
                Some(topology) => candidate
                    .atoms(topology)
                    .any(|atom| !self.boundary.holds_disc(&atom.position, atom.radius)),
                None => !self.boundary.holds_disc(&candidate.position, 0.0),
            };
            if outside {
                return true;
            }
        }
        self.objects
            .iter()
            .any(|existing| self.objects_clash(candidate, existing))
    }
}
