//! # Geometry Module
//!
//! Planar primitives shared by the configuration and the force field.
//!
//! - [`polygon`] - Arbitrary simple polygons used as closed boundaries
//! - [`planar`] - Small helpers: orientation tests, segment distances and
//!   periodic image shifts

pub mod planar;
pub mod polygon;
