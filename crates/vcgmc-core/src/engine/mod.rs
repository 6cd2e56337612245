//! # Engine Module
//!
//! This module implements the stateful Metropolis Monte Carlo sampler that drives
//! a [`crate::core::configuration::Configuration`] towards equilibrium.
//!
//! ## Overview
//!
//! An [`integrator::Integrator`] repeatedly proposes a move of one randomly chosen
//! object, evaluates the energy change through the configuration's cached energies
//! and accepts or rejects it with the Metropolis criterion. Proposal sizes adapt
//! twice over: a global step bound follows the integrator's acceptance ratio, and
//! each object carries its own bound and move history.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Integrator tunables and NVT run parameters with builders
//! - **Move Policy** ([`policy`]) - Bootstrap versus adaptive move selection per object
//! - **Sampling** ([`integrator`]) - The Metropolis step loop and step-bound recalibration
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - Engine-level errors wrapping loader and geometry failures

pub mod config;
pub mod error;
pub mod integrator;
pub mod policy;
pub mod progress;
