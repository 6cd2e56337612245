//! # Force Field Module
//!
//! The interaction law between atoms: a hard repulsive core, a linear tail
//! scaled by a per-type-pair energy matrix, a barrier ramp for atoms drawn in
//! the barrier color, and a wall penalty for closed boundaries.
//!
//! - [`params`] - The [`params::ForceField`] type, its text format and loaders
//! - `potentials` - The radial functions the force field is assembled from

pub mod params;
pub(crate) mod potentials;
