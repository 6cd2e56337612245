//! # Workflows Module
//!
//! This module provides the complete procedures a front end runs on a
//! configuration read from disk.
//!
//! ## Overview
//!
//! Each workflow loads the resources it needs, drives the [`crate::engine`]
//! and [`crate::core`] layers, reports progress through a
//! [`crate::engine::progress::ProgressReporter`] and returns its result
//! without touching the filesystem beyond its inputs. Output destinations are
//! supplied by the caller.
//!
//! ## Architecture
//!
//! - **NVT Workflow** ([`nvt`]) - Periodic setup, initial clash relief and a
//!   reported production run at constant volume and temperature
//! - **Hull Workflow** ([`hull`]) - Replaces the boundary with the convex hull
//!   of the objects, optionally grown around every atom

pub mod hull;
pub mod nvt;
