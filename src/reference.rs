//! Reference scoring formula.
//!
//! A weighted sum of Gaussian penalties around Earth values, followed by
//! multiplicative regime clamps for strongly irradiated and strongly starved
//! bodies:
//!
//! ```text
//! S     = Σ w_i · exp(-((x_i - opt_i) / σ_i)^2)
//! score = clamp(S · hot(insol) · cold(insol), 0, 1)
//! ```
//!
//! Deterministic and total over canonical feature vectors. It is used to
//! generate training labels and as the default scorer for calibration and the
//! validation gates.

use serde::Serialize;

use crate::domain::{ComponentScores, Feature, FeatureVector, RegimeTag};
use crate::math::{clamp, gaussian};

struct Component {
    feature: Feature,
    optimal: f64,
    sigma: f64,
    weight: f64,
}

const FLUX: Component = Component {
    feature: Feature::Insolation,
    optimal: 1.0,
    sigma: 0.85,
    weight: 0.30,
};
const TEMPERATURE: Component = Component {
    feature: Feature::EquilibriumTemperature,
    optimal: 255.0,
    sigma: 60.0,
    weight: 0.25,
};
const RADIUS: Component = Component {
    feature: Feature::Radius,
    optimal: 1.0,
    sigma: 0.60,
    weight: 0.22,
};
const DENSITY: Component = Component {
    feature: Feature::Density,
    optimal: 5.51,
    sigma: 2.0,
    weight: 0.18,
};
const ECCENTRICITY: Component = Component {
    feature: Feature::Eccentricity,
    optimal: 0.02,
    sigma: 0.10,
    weight: 0.05,
};

const COMPONENTS: [&Component; 5] = [&FLUX, &TEMPERATURE, &RADIUS, &DENSITY, &ECCENTRICITY];

/// Hot tier, checked in order; first match wins.
const HOT_TIERS: [(f64, RegimeTag); 3] = [
    (5.0, RegimeTag::ExtremeHot),
    (3.0, RegimeTag::SevereHot),
    (1.9, RegimeTag::ModerateHot),
];
/// Cold tier, checked in order; first match wins.
const COLD_TIERS: [(f64, RegimeTag); 2] = [
    (0.05, RegimeTag::ExtremeCold),
    (0.15, RegimeTag::ModerateCold),
];

/// Full breakdown of one reference evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceScore {
    /// Final score in `[0, 1]`.
    pub score: f64,
    pub weighted_sum: f64,
    pub multiplier: f64,
    pub components: ComponentScores,
    pub regime_tags: Vec<RegimeTag>,
}

impl Component {
    fn eval(&self, v: &FeatureVector) -> f64 {
        gaussian(v.get(self.feature), self.optimal, self.sigma)
    }
}

/// Sum of the component weights; exactly 1 up to rounding.
pub fn weight_sum() -> f64 {
    COMPONENTS.iter().map(|c| c.weight).sum()
}

/// `(feature, weight)` for every component.
pub fn feature_weights() -> [(Feature, f64); 5] {
    COMPONENTS.map(|c| (c.feature, c.weight))
}

/// Regime tags that fire for an insolation value, hot tier first.
pub fn regime_tags(insolation: f64) -> Vec<RegimeTag> {
    let hot = HOT_TIERS
        .iter()
        .find(|(threshold, _)| insolation >= *threshold)
        .map(|(_, tag)| *tag);
    let cold = COLD_TIERS
        .iter()
        .find(|(threshold, _)| insolation <= *threshold)
        .map(|(_, tag)| *tag);
    hot.into_iter().chain(cold).collect()
}

pub fn score(v: &FeatureVector) -> ReferenceScore {
    debug_assert!((weight_sum() - 1.0).abs() < 1e-6);

    let components = ComponentScores {
        flux: FLUX.eval(v),
        temperature: TEMPERATURE.eval(v),
        radius: RADIUS.eval(v),
        density: DENSITY.eval(v),
        eccentricity: ECCENTRICITY.eval(v),
    };
    let weighted_sum = FLUX.weight * components.flux
        + TEMPERATURE.weight * components.temperature
        + RADIUS.weight * components.radius
        + DENSITY.weight * components.density
        + ECCENTRICITY.weight * components.eccentricity;

    let regime_tags = regime_tags(v.get(Feature::Insolation));
    let multiplier: f64 = regime_tags.iter().map(|t| t.multiplier()).product();

    ReferenceScore {
        score: clamp(weighted_sum * multiplier, 0.0, 1.0),
        weighted_sum,
        multiplier,
        components,
        regime_tags,
    }
}
