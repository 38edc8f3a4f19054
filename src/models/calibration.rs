//! Earth-relative calibration: Earth scores exactly 100.
//!
//! The reference raw score is computed once, through the same canonicalizer
//! and adapter that serve live predictions, so `calibrate(reference_raw)` is
//! exactly 100 without any special-casing.

use serde::Serialize;

use crate::error::Result;
use crate::features::earth_reference;
use crate::math::clamp;
use crate::models::adapter::ModelAdapter;

/// Half-width of the band snapped to 100 for the Earth preset.
const PRESET_SNAP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EarthCalibration {
    reference_raw: f64,
}

impl EarthCalibration {
    /// Calibrate against the adapter's prediction for canonical Earth.
    pub fn new(adapter: &ModelAdapter) -> Result<Self> {
        let reference_raw = adapter.predict_raw(&earth_reference())?;
        if reference_raw <= 0.0 {
            tracing::warn!(
                version = adapter.version(),
                "model scores Earth at zero; calibration falls back to raw * 100"
            );
        } else {
            tracing::info!(version = adapter.version(), reference_raw, "earth calibration reference");
        }
        Ok(Self { reference_raw })
    }

    pub fn from_reference_raw(reference_raw: f64) -> Self {
        Self { reference_raw }
    }

    pub fn reference_raw(&self) -> f64 {
        self.reference_raw
    }

    /// Map a raw `[0, 1]` score to `[0, 100]` with Earth at 100.
    pub fn calibrate(&self, raw: f64) -> f64 {
        let scaled = if self.reference_raw > 0.0 {
            raw / self.reference_raw * 100.0
        } else {
            raw * 100.0
        };
        clamp(scaled, 0.0, 100.0)
    }

    /// Like [`calibrate`](Self::calibrate), snapping `(99, 101)` to exactly 100
    /// when the input is the literal Earth preset.
    pub fn calibrate_preset(&self, raw: f64, is_earth_preset: bool) -> f64 {
        let score = self.calibrate(raw);
        if is_earth_preset && (score - 100.0).abs() < PRESET_SNAP {
            100.0
        } else {
            score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSchema;
    use crate::validation::bodies::MARS;

    #[test]
    fn earth_calibrates_to_exactly_100() {
        let adapter = ModelAdapter::reference(&FeatureSchema::builtin()).unwrap();
        let cal = EarthCalibration::new(&adapter).unwrap();
        assert_eq!(cal.calibrate(cal.reference_raw()), 100.0);

        let earth_raw = adapter.predict_raw(&earth_reference()).unwrap();
        assert_eq!(cal.calibrate(earth_raw), 100.0);

        let mars = cal.calibrate(adapter.predict_raw(&MARS.features()).unwrap());
        assert!(mars > 0.0 && mars < 100.0);
    }

    #[test]
    fn zero_reference_degrades_to_percent() {
        let cal = EarthCalibration::from_reference_raw(0.0);
        assert_eq!(cal.calibrate(0.42), 42.0);
        assert_eq!(cal.calibrate(2.0), 100.0);
    }

    #[test]
    fn results_are_clamped() {
        let cal = EarthCalibration::from_reference_raw(0.5);
        assert_eq!(cal.calibrate(0.9), 100.0);
        assert_eq!(cal.calibrate(-0.1), 0.0);
    }

    #[test]
    fn preset_snap_only_applies_to_earth() {
        let cal = EarthCalibration::from_reference_raw(0.5);
        assert_eq!(cal.calibrate_preset(0.4975, true), 100.0);
        assert!((cal.calibrate_preset(0.4975, false) - 99.5).abs() < 1e-9);
        assert!((cal.calibrate_preset(0.49, true) - 98.0).abs() < 1e-9);
    }
}
