//! # Core Module
//!
//! This module provides the models, interaction law and configuration operations
//! that the sampler in [`crate::engine`] drives.
//!
//! ## Overview
//!
//! Everything here is deterministic given its inputs: random draws come from a
//! caller-provided generator and proposed moves are reported to a caller-provided
//! observer. The module owns no run state beyond the [`configuration::Configuration`]
//! values handed to it.
//!
//! ## Architecture
//!
//! - **Plane Geometry** ([`geometry`]) - Polygons, nearest-image shifts and small vector helpers
//! - **Bodies** ([`models`]) - Rigid objects and the topology describing their atoms
//! - **Interaction Law** ([`forcefield`]) - Atom radii, colors, energy matrix and the radial potential
//! - **Simulated State** ([`configuration`]) - Boundary, objects, cached energy, clashes and moves
//! - **File I/O** ([`io`]) - Configuration files and trajectory frames
//! - **Move Reporting** ([`observe`]) - Observer collaborator receiving every proposed move

pub mod configuration;
pub mod forcefield;
pub mod geometry;
pub mod io;
pub mod models;
pub mod observe;
