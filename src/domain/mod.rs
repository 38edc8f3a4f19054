//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical feature order (`Feature`) and vector (`FeatureVector`)
//! - namespaced sparse inputs (`RawRecord`, `PlanetFields`, `StarFields`)
//! - scoring outputs (`ScoreResult`, `ComponentScores`, `RegimeTag`, etc.)

pub mod types;

pub use types::*;
