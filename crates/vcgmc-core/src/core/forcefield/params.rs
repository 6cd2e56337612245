use super::potentials::{barrier_ramp, hard_core, linear_tail, wall_penalty};
use crate::core::io::lines::ContentLines;
use nalgebra::DMatrix;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const BIG_ENERGY: f64 = 1.0e7;

/// Atoms with this display color use the barrier ramp instead of the
/// tabulated tail.
pub const BARRIER_COLOR: &str = "green";

const DEFAULT_COLOR: &str = "red";
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Pairwise interaction law parameterized by atom type.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceField {
    radius: Vec<f64>,
    color: Vec<String>,
    energy: DMatrix<f64>,
    pub cut_off: f64,
    pub length: f64,
    pub barrier: f64,
    pub big_energy: f64,
}

#[derive(Debug, Error)]
pub enum ForceFieldError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Read error: {0}")]
    Read(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ForceFieldParseErrorKind,
    },
    #[error("Force field ends before the {0} section")]
    MissingSection(&'static str),
    #[error("Energy matrix is not symmetric: E[{row}][{col}] = {upper}, E[{col}][{row}] = {lower}")]
    Asymmetric {
        row: usize,
        col: usize,
        upper: f64,
        lower: f64,
    },
}

#[derive(Debug, Error)]
pub enum ForceFieldParseErrorKind {
    #[error("Invalid number of atom types '{value}'")]
    InvalidTypeCount { value: String },
    #[error("Invalid number '{value}' in {section}")]
    InvalidFloat {
        section: &'static str,
        value: String,
    },
    #[error("Expected {expected} value(s) in {section}, found {found}")]
    WrongValueCount {
        section: &'static str,
        expected: usize,
        found: usize,
    },
}

impl ForceField {
    /// Single isotropic repulsive type of radius `r`.
    pub fn repulsive(r: f64) -> Self {
        Self {
            radius: vec![r],
            color: vec![DEFAULT_COLOR.to_string()],
            energy: DMatrix::zeros(1, 1),
            cut_off: 2.0 * r,
            length: 1.0,
            barrier: 0.0,
            big_energy: BIG_ENERGY,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ForceFieldError> {
        let file = File::open(path).map_err(|e| ForceFieldError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let forces = Self::read_from(&mut BufReader::new(file))?;
        debug!(
            path = %path.display(),
            n_types = forces.type_max(),
            "Loaded force field."
        );
        Ok(forces)
    }

    /// Reads the five-section format, ignoring blank lines and `#` comments.
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, ForceFieldError> {
        Self::from_sections(ContentLines::new(reader))
    }

    /// Replaces this force field with the contents of a file laid out strictly
    /// line by line, with no blank or comment lines allowed between sections.
    pub fn update(&mut self, path: &Path) -> Result<(), ForceFieldError> {
        let file = File::open(path).map_err(|e| ForceFieldError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        self.update_from(&mut BufReader::new(file))
    }

    pub fn update_from(&mut self, reader: &mut impl BufRead) -> Result<(), ForceFieldError> {
        let raw = reader
            .lines()
            .enumerate()
            .map(|(i, line)| line.map(|l| (i + 1, l.trim().to_string())));
        *self = Self::from_sections(raw)?;
        Ok(())
    }

    fn from_sections(
        mut lines: impl Iterator<Item = io::Result<(usize, String)>>,
    ) -> Result<Self, ForceFieldError> {
        let mut next_line = |section: &'static str| -> Result<(usize, String), ForceFieldError> {
            lines
                .next()
                .ok_or(ForceFieldError::MissingSection(section))?
                .map_err(ForceFieldError::from)
        };

        let (line, content) = next_line("type count")?;
        let type_max = content
            .split_whitespace()
            .next()
            .and_then(|t| t.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| ForceFieldError::Parse {
                line,
                kind: ForceFieldParseErrorKind::InvalidTypeCount { value: content.clone() },
            })?;

        let (line, content) = next_line("radius")?;
        let radius = parse_floats(line, &content, "radius", type_max)?;

        let (line, content) = next_line("color")?;
        let color: Vec<String> = content.split_whitespace().map(str::to_string).collect();
        if color.len() != type_max {
            return Err(ForceFieldError::Parse {
                line,
                kind: ForceFieldParseErrorKind::WrongValueCount {
                    section: "color",
                    expected: type_max,
                    found: color.len(),
                },
            });
        }

        let (line, content) = next_line("range")?;
        let range = parse_floats(line, &content, "cut_off/length/barrier", 3)?;

        let mut rows = Vec::new();
        for _ in 0..type_max {
            let (line, content) = next_line("energy matrix")?;
            rows.extend(parse_floats(line, &content, "energy matrix", type_max)?);
        }
        let energy = DMatrix::from_row_slice(type_max, type_max, &rows);

        let forces = Self {
            radius,
            color,
            energy,
            cut_off: range[0],
            length: range[1],
            barrier: range[2],
            big_energy: BIG_ENERGY,
        };
        forces.check_symmetry()?;
        Ok(forces)
    }

    fn check_symmetry(&self) -> Result<(), ForceFieldError> {
        let n = self.type_max();
        for row in 0..n {
            for col in (row + 1)..n {
                let upper = self.energy[(row, col)];
                let lower = self.energy[(col, row)];
                if (upper - lower).abs() > SYMMETRY_TOLERANCE * (1.0 + upper.abs()) {
                    return Err(ForceFieldError::Asymmetric {
                        row,
                        col,
                        upper,
                        lower,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn type_max(&self) -> usize {
        self.radius.len()
    }

    pub fn size(&self, atom_type: usize) -> f64 {
        self.radius[atom_type]
    }

    pub fn color(&self, atom_type: usize) -> &str {
        &self.color[atom_type]
    }

    pub fn energy(&self, t1: usize, t2: usize) -> f64 {
        self.energy[(t1, t2)]
    }

    /// Potential between an atom of type `t1` drawn in `color` and an atom of
    /// type `t2`, their centres `r` apart.
    ///
    /// Zero beyond `cut_off`. Overlapping atoms get the hard-core penalty.
    /// Within `length` of contact, barrier-colored atoms follow the barrier
    /// ramp and all others the tabulated linear tail.
    pub fn interaction(&self, t1: usize, t2: usize, color: &str, r: f64) -> f64 {
        if r >= self.cut_off {
            return 0.0;
        }
        let contact = self.radius[t1] + self.radius[t2];
        let separation = r - contact;
        if separation < 0.0 {
            hard_core(separation, contact, self.big_energy)
        } else if separation < self.length {
            if color == BARRIER_COLOR {
                barrier_ramp(separation, self.barrier, self.cut_off)
            } else {
                linear_tail(separation, self.length, self.energy[(t1, t2)])
            }
        } else {
            0.0
        }
    }

    /// Penalty for an atom of type `atom_type` whose centre is `distance` from
    /// a closed boundary.
    pub fn wall_interaction(&self, atom_type: usize, distance: f64) -> f64 {
        wall_penalty(distance, self.radius[atom_type], self.big_energy)
    }

    /// Writes the force field in the format accepted by [`ForceField::read_from`].
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        let n = self.type_max();
        writeln!(writer, "# atom types")?;
        writeln!(writer, "{}", n)?;
        writeln!(writer, "# radii")?;
        writeln!(writer, "{}", join(self.radius.iter()))?;
        writeln!(writer, "# colors")?;
        writeln!(writer, "{}", self.color.join(" "))?;
        writeln!(writer, "# cut_off length barrier")?;
        writeln!(writer, "{} {} {}", self.cut_off, self.length, self.barrier)?;
        writeln!(writer, "# energy matrix")?;
        for row in 0..n {
            writeln!(writer, "{}", join(self.energy.row(row).iter()))?;
        }
        Ok(())
    }
}

fn join<'a>(values: impl Iterator<Item = &'a f64>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_floats(
    line: usize,
    content: &str,
    section: &'static str,
    expected: usize,
) -> Result<Vec<f64>, ForceFieldError> {
    let values = content
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| ForceFieldError::Parse {
                line,
                kind: ForceFieldParseErrorKind::InvalidFloat {
                    section,
                    value: token.to_string(),
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != expected {
        return Err(ForceFieldError::Parse {
            line,
            kind: ForceFieldParseErrorKind::WrongValueCount {
                section,
                expected,
                found: values.len(),
            },
        });
    }
    Ok(values)
}

impl fmt::Display for ForceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary of the force-field")?;
        writeln!(f, "Cut off is {}", self.cut_off)?;
        writeln!(f, "Length scale is {}", self.length)?;
        writeln!(f, "Barrier is {}", self.barrier)?;
        writeln!(f, "Number of atom types is {}", self.type_max())?;
        writeln!(f, "Colors are [{}]", self.color.join(", "))?;
        let radii: Vec<String> = self.radius.iter().map(|r| format!("{:7.3}", r)).collect();
        writeln!(f, "Radius array is [{}]", radii.join(", "))?;
        write!(f, "Energy array is [")?;
        for row in 0..self.type_max() {
            if row > 0 {
                write!(f, "\n                 ")?;
            }
            let values: Vec<String> = self
                .energy
                .row(row)
                .iter()
                .map(|e| format!("{:7.3}", e))
                .collect();
            write!(f, "[{}]", values.join(", "))?;
        }
        writeln!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    const TWO_TYPES: &str = "# two bead types\n\
        2\n\
        0.5 0.25   # radii\n\
        \n\
        red green\n\
        3.0 1.0 0.5\n\
        -1.0 -0.5\n\
        -0.5 -2.0\n";

    fn two_types() -> ForceField {
        ForceField::read_from(&mut Cursor::new(TWO_TYPES)).unwrap()
    }

    #[test]
    fn read_from_parses_all_five_sections() {
        let ff = two_types();
        assert_eq!(ff.type_max(), 2);
        assert_eq!(ff.size(1), 0.25);
        assert_eq!(ff.color(1), "green");
        assert_eq!(ff.cut_off, 3.0);
        assert_eq!(ff.length, 1.0);
        assert_eq!(ff.barrier, 0.5);
        assert_eq!(ff.energy(0, 1), -0.5);
        assert_eq!(ff.energy(1, 1), -2.0);
        assert_eq!(ff.big_energy, BIG_ENERGY);
    }

    #[test]
    fn read_from_rejects_non_positive_type_count() {
        let result = ForceField::read_from(&mut Cursor::new("0\n"));
        assert!(matches!(
            result,
            Err(ForceFieldError::Parse {
                line: 1,
                kind: ForceFieldParseErrorKind::InvalidTypeCount { .. }
            })
        ));
    }

    #[test]
    fn read_from_rejects_wrong_number_of_radii() {
        let result = ForceField::read_from(&mut Cursor::new("2\n0.5\nred red\n"));
        assert!(matches!(
            result,
            Err(ForceFieldError::Parse {
                line: 2,
                kind: ForceFieldParseErrorKind::WrongValueCount {
                    expected: 2,
                    found: 1,
                    ..
                }
            })
        ));
    }

    #[test]
    fn read_from_rejects_invalid_number() {
        let result = ForceField::read_from(&mut Cursor::new("1\nabc\n"));
        assert!(matches!(
            result,
            Err(ForceFieldError::Parse {
                kind: ForceFieldParseErrorKind::InvalidFloat { .. },
                ..
            })
        ));
    }

    #[test]
    fn read_from_reports_truncated_matrix() {
        let result = ForceField::read_from(&mut Cursor::new("2\n0.5 0.5\nred red\n2 1 0\n0 0\n"));
        assert!(matches!(
            result,
            Err(ForceFieldError::MissingSection("energy matrix"))
        ));
    }

    #[test]
    fn read_from_rejects_asymmetric_energy_matrix() {
        let text = "2\n0.5 0.5\nred red\n2 1 0\n0 1\n2 0\n";
        let result = ForceField::read_from(&mut Cursor::new(text));
        assert!(matches!(
            result,
            Err(ForceFieldError::Asymmetric { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn update_replaces_contents_from_strict_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.ff");
        fs::write(&path, "1\n0.7\nblue\n1.5 0.5 0.0\n-3.0\n").unwrap();
        let mut ff = ForceField::repulsive(1.0);
        ff.update(&path).unwrap();
        assert_eq!(ff.type_max(), 1);
        assert_eq!(ff.size(0), 0.7);
        assert_eq!(ff.color(0), "blue");
        assert_eq!(ff.cut_off, 1.5);
        assert_eq!(ff.energy(0, 0), -3.0);
    }

    #[test]
    fn update_does_not_skip_comment_lines() {
        let mut ff = ForceField::repulsive(1.0);
        let result = ff.update_from(&mut Cursor::new("# comment\n1\n0.7\n"));
        assert!(matches!(result, Err(ForceFieldError::Parse { line: 1, .. })));
        assert_eq!(ff, ForceField::repulsive(1.0));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = ForceField::load(&dir.path().join("none.ff"));
        assert!(matches!(result, Err(ForceFieldError::Io { .. })));
    }

    #[test]
    fn repulsive_force_field_has_single_red_type() {
        let ff = ForceField::repulsive(0.5);
        assert_eq!(ff.type_max(), 1);
        assert_eq!(ff.cut_off, 1.0);
        assert_eq!(ff.color(0), "red");
        assert_eq!(ff.energy(0, 0), 0.0);
        assert_eq!(ff.length, 1.0);
        assert_eq!(ff.big_energy, BIG_ENERGY);
        assert!(ff.interaction(0, 0, ff.color(0), 0.5) >= BIG_ENERGY);
        assert!(ff.wall_interaction(0, 1.0).is_finite());
    }

    #[test]
    fn interaction_is_zero_beyond_cut_off() {
        let ff = two_types();
        assert_eq!(ff.interaction(0, 0, "red", 3.0), 0.0);
        assert_eq!(ff.interaction(0, 0, "red", 10.0), 0.0);
    }

    #[test]
    fn interaction_penalizes_overlap_at_least_big_energy() {
        let ff = two_types();
        let value = ff.interaction(0, 0, "red", 0.5);
        assert!(f64_approx_equal(value, BIG_ENERGY * 1.5));
    }

    #[test]
    fn interaction_tail_decays_linearly_for_ordinary_colors() {
        let ff = two_types();
        assert!(f64_approx_equal(ff.interaction(0, 1, "red", 0.75), -0.5));
        assert!(f64_approx_equal(ff.interaction(0, 1, "red", 1.25), -0.25));
        assert_eq!(ff.interaction(0, 1, "red", 1.75), 0.0);
    }

    #[test]
    fn interaction_uses_barrier_ramp_for_barrier_color() {
        let ff = two_types();
        let ramp = ff.interaction(1, 1, BARRIER_COLOR, 0.75);
        assert!(f64_approx_equal(ramp, 0.5 / 1.5 * 0.25));
        let plateau = ff.interaction(1, 1, BARRIER_COLOR, 1.2);
        assert!(f64_approx_equal(plateau, 0.5 * (1.0 + 1.0 / 1.5)));
    }

    #[test]
    fn wall_interaction_uses_type_radius() {
        let ff = two_types();
        assert_eq!(ff.wall_interaction(0, 0.6), 0.0);
        assert!(f64_approx_equal(ff.wall_interaction(0, 0.25), BIG_ENERGY * 1.5));
    }

    #[test]
    fn write_to_output_reads_back_identically() {
        let ff = two_types();
        let mut buffer = Vec::new();
        ff.write_to(&mut buffer).unwrap();
        let again = ForceField::read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(again, ff);
    }

    #[test]
    fn display_summarizes_parameters() {
        let summary = two_types().to_string();
        assert!(summary.contains("Cut off is 3"));
        assert!(summary.contains("Number of atom types is 2"));
        assert!(summary.contains("red, green"));
    }
}
