pub mod hull;
pub mod nvt;
