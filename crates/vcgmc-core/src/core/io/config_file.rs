use super::lines::ContentLines;
use super::traits::StateFile;
use crate::core::configuration::Configuration;
use crate::core::configuration::boundary::Boundary;
use crate::core::geometry::polygon::Polygon;
use crate::core::models::object::Object;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ConfigFileParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigFileParseErrorKind {
    #[error("Invalid integer in {field} (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in {field} (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Expected {expected} fields in {record}, found {found}")]
    TooFewFields {
        record: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Line-oriented configuration format.
///
/// ```text
/// x_size y_size            # "0 0" announces a polygon
/// n_vertex                 # polygon only
/// x y                      # polygon only, n_vertex lines
/// n_objects
/// type x y orientation     # n_objects lines
/// ```
///
/// Rectangles read from a file are periodic; polygons never are.
pub struct ConfigFile;

/// Splits a record into exactly `N` leading fields, ignoring trailing ones.
fn fields<'a, const N: usize>(
    line: usize,
    content: &'a str,
    record: &'static str,
) -> Result<[&'a str; N], ConfigFileError> {
    let tokens: Vec<&str> = content.split_whitespace().take(N).collect();
    let found = tokens.len();
    tokens.try_into().map_err(|_| ConfigFileError::Parse {
        line,
        kind: ConfigFileParseErrorKind::TooFewFields {
            record,
            expected: N,
            found,
        },
    })
}

fn parse_float(line: usize, value: &str, field: &'static str) -> Result<f64, ConfigFileError> {
    value.parse().map_err(|_| ConfigFileError::Parse {
        line,
        kind: ConfigFileParseErrorKind::InvalidFloat {
            field,
            value: value.to_string(),
        },
    })
}

fn parse_count(line: usize, value: &str, field: &'static str) -> Result<usize, ConfigFileError> {
    value.parse().map_err(|_| ConfigFileError::Parse {
        line,
        kind: ConfigFileParseErrorKind::InvalidInt {
            field,
            value: value.to_string(),
        },
    })
}

impl StateFile for ConfigFile {
    type Error = ConfigFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Configuration, Self::Error> {
        let mut lines = ContentLines::new(reader);
        let mut next_record = |record: &'static str| -> Result<(usize, String), ConfigFileError> {
            lines
                .next()
                .ok_or(ConfigFileError::MissingRecord(record))?
                .map_err(ConfigFileError::from)
        };

        let (line, content) = next_record("box size")?;
        let [x, y] = fields::<2>(line, &content, "box size")?;
        let x_size = parse_float(line, x, "x_size")?;
        let y_size = parse_float(line, y, "y_size")?;

        let boundary = if x_size == 0.0 {
            let (line, content) = next_record("vertex count")?;
            let [count] = fields::<1>(line, &content, "vertex count")?;
            let n_vertex = parse_count(line, count, "vertex count")?;
            let mut polygon = Polygon::new();
            for _ in 0..n_vertex {
                let (line, content) = next_record("polygon vertex")?;
                let [vx, vy] = fields::<2>(line, &content, "polygon vertex")?;
                polygon.add_vertex(
                    parse_float(line, vx, "vertex x")?,
                    parse_float(line, vy, "vertex y")?,
                );
            }
            Boundary::Polygon(polygon)
        } else {
            Boundary::rectangle(x_size, y_size, true)
        };

        let (line, content) = next_record("object count")?;
        let [count] = fields::<1>(line, &content, "object count")?;
        let n_objects = parse_count(line, count, "object count")?;

        let mut objects = Vec::new();
        for _ in 0..n_objects {
            let (line, content) = next_record("object")?;
            let [t, x, y, angle] = fields::<4>(line, &content, "object")?;
            objects.push(Object::new(
                parse_count(line, t, "object type")?,
                parse_float(line, x, "object x")?,
                parse_float(line, y, "object y")?,
                parse_float(line, angle, "object orientation")?,
            ));
        }

        Ok(Configuration::with_objects(boundary, objects))
    }

    fn write_to(state: &Configuration, writer: &mut impl Write) -> Result<(), Self::Error> {
        state.write(writer)?;
        Ok(())
    }
}
