//! Low-level utilities shared across the crate

pub mod linalg;
