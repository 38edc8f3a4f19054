//! Derived physical quantities (density, escape velocity, tidal locking,
//! stellar luminosity, insolation, equilibrium and surface temperature).
//!
//! Everything here is a pure function so the canonicalizer and the legacy
//! single-value scorers can share the exact same formulas.

pub mod derived;

pub use derived::*;
