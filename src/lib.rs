//! `hab-score` library crate.
//!
//! The binary (`hab`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the scorer can be embedded in a simulator front-end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod math;
pub mod models;
pub mod physics;
pub mod reference;
pub mod report;
pub mod surface;
pub mod validation;
