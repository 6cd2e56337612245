//! # vcgmc
//!
//! Metropolis Monte Carlo sampling of rigid, coarse-grained objects built
//! from discs and confined to a plane.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Plane geometry, the object and topology
//!   models, the force field and the [`core::configuration::Configuration`]
//!   with its cached energy, clash tests and move primitives. Also the
//!   configuration and trajectory file formats.
//!
//! - **[`engine`]: The Sampler.** The stateful Metropolis
//!   [`engine::integrator::Integrator`] with its adaptive step bounds, the
//!   per-object move policy, run parameters with validating builders and
//!   progress reporting.
//!
//! - **[`workflows`]: The Public API.** Complete procedures such as an NVT
//!   run with initial clash relief, or deriving a polygonal boundary from a
//!   configuration's convex hull.

pub mod core;
pub mod engine;
pub mod workflows;
