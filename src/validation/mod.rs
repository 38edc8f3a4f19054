//! Offline validation: Solar System gates and the pipeline sanity report.

pub mod bodies;
pub mod gates;
pub mod sanity;

pub use bodies::{SOLAR_SYSTEM, SolarBody};
pub use gates::{GATES, GateCheck, GateDetail, GateReport, GateResult, ValidationGate, run_gates};
pub use sanity::{CheckResult, CheckStatus, Checks, SanityReport, run_sanity_check};
