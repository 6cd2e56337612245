//! # Models Module
//!
//! The bodies the simulation moves around and the static description of
//! what they are made of.
//!
//! - [`object`] - A rigid body with a pose, adaptive step bound, move statistics
//!   and a cached energy
//! - [`topology`] - Atom types and the molecule (atom arrangement) of each object type

pub mod object;
pub mod topology;
