//! Scoring models and everything around them.
//!
//! - model trait and artifact formats (`model`, `tree`, `linear`)
//! - versioned registry (`registry`)
//! - inference adapter with schema check (`adapter`)
//! - Earth calibration (`calibration`) and the end-to-end `Scorer` (`scorer`)

pub mod adapter;
pub mod calibration;
pub mod linear;
pub mod model;
pub mod registry;
pub mod scorer;
pub mod tree;

pub use adapter::{Explanation, ModelAdapter};
pub use calibration::EarthCalibration;
pub use linear::{Link, LinearModel};
pub use model::*;
pub use registry::{LoadedModel, ModelEntry, ModelRegistry};
pub use scorer::{BodyPrediction, DATA_INCOMPLETE, RecordScore, Scorer};
pub use tree::TreeEnsemble;
