//! Provides text input/output for simulation states.
//!
//! Configurations are stored in a small line-oriented format: the boundary
//! header, an object count and one `type x y orientation` record per object.
//! Blank lines and `#` comments are tolerated on input. Trajectories are
//! sequences of such records separated by step markers.

pub mod config_file;
pub mod lines;
pub mod trajectory;
pub mod traits;
