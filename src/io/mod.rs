//! Input/output helpers.
//!
//! - CSV ingest of archive-style records (`ingest`)
//! - score and label CSV exports (`export`)
//! - timestamped JSON reports (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
