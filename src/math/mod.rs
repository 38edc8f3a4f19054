//! Mathematical utilities: scoring kernels and clamping.

pub mod kernels;

pub use kernels::*;
