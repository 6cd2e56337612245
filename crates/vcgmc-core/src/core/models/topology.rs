use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

const DEFAULT_SYMMETRY: u32 = 4;

fn default_symmetry() -> u32 {
    DEFAULT_SYMMETRY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtomType {
    pub radius: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoleculeAtom {
    #[serde(rename = "type")]
    pub atom_type: usize,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Rigid arrangement of atoms making up one object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Molecule {
    /// Order of the rotational symmetry used when drawing rotation moves.
    #[serde(default = "default_symmetry")]
    pub symmetry: u32,
    pub atoms: Vec<MoleculeAtom>,
}

impl Molecule {
    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Largest distance from the molecule centre to any atom centre.
    pub fn extent(&self) -> f64 {
        self.atoms
            .iter()
            .map(|a| a.x.hypot(a.y))
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Topology {
    atom_types: Vec<AtomType>,
    molecules: Vec<Molecule>,
}

#[derive(Debug, Error)]
pub enum TopologyLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Topology '{path}' defines no {what}")]
    Empty { path: String, what: &'static str },
    #[error("Molecule {molecule} references undefined atom type {atom_type}")]
    InvalidAtomType { molecule: usize, atom_type: usize },
}

impl Topology {
    pub fn new(
        atom_types: Vec<AtomType>,
        molecules: Vec<Molecule>,
    ) -> Result<Self, TopologyLoadError> {
        let topology = Self {
            atom_types,
            molecules,
        };
        topology.validate("<memory>")?;
        Ok(topology)
    }

    /// One molecule made of a single atom of type 0 sitting on the object centre.
    pub fn single_disc(radius: f64, color: &str) -> Self {
        Self {
            atom_types: vec![AtomType {
                radius,
                color: color.to_string(),
            }],
            molecules: vec![Molecule {
                symmetry: DEFAULT_SYMMETRY,
                atoms: vec![MoleculeAtom {
                    atom_type: 0,
                    x: 0.0,
                    y: 0.0,
                    color: None,
                }],
            }],
        }
    }

    pub fn load(path: &Path) -> Result<Self, TopologyLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| TopologyLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn parse(content: &str, origin: &str) -> Result<Self, TopologyLoadError> {
        let topology: Topology = toml::from_str(content).map_err(|e| TopologyLoadError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        topology.validate(origin)?;
        Ok(topology)
    }

    fn validate(&self, origin: &str) -> Result<(), TopologyLoadError> {
        if self.atom_types.is_empty() {
            return Err(TopologyLoadError::Empty {
                path: origin.to_string(),
                what: "atom types",
            });
        }
        if self.molecules.is_empty() {
            return Err(TopologyLoadError::Empty {
                path: origin.to_string(),
                what: "molecules",
            });
        }
        for (index, molecule) in self.molecules.iter().enumerate() {
            if let Some(atom) = molecule
                .atoms
                .iter()
                .find(|a| a.atom_type >= self.atom_types.len())
            {
                return Err(TopologyLoadError::InvalidAtomType {
                    molecule: index,
                    atom_type: atom.atom_type,
                });
            }
        }
        Ok(())
    }

    pub fn n_atom_types(&self) -> usize {
        self.atom_types.len()
    }

    pub fn n_molecules(&self) -> usize {
        self.molecules.len()
    }

    pub fn atom_size(&self, atom_type: usize) -> f64 {
        self.atom_types[atom_type].radius
    }

    pub fn atom_color(&self, atom_type: usize) -> &str {
        &self.atom_types[atom_type].color
    }

    /// Molecule for an object type. Panics when the type has no molecule.
    pub fn molecule(&self, object_type: usize) -> &Molecule {
        &self.molecules[object_type]
    }

    pub fn symmetry(&self, object_type: usize) -> u32 {
        self.molecule(object_type).symmetry.max(1)
    }

    pub fn min_atom_radius(&self) -> f64 {
        self.atom_types
            .iter()
            .map(|t| t.radius)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_extent(&self) -> f64 {
        self.molecules
            .iter()
            .map(Molecule::extent)
            .fold(0.0, f64::max)
    }

    pub fn write(&self, writer: &mut impl Write) -> io::Result<()> {
        let text = toml::to_string(self).map_err(io::Error::other)?;
        writer.write_all(text.as_bytes())
    }
}
