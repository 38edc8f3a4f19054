//! Synthetic data for the label-generation half of the training pipeline.

pub mod synthetic;

pub use synthetic::{LabeledRecord, SyntheticConfig, generate_labels, generate_records, label_records};
