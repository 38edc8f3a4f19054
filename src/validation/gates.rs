//! Ranking and ratio gates over the Solar System bodies.
//!
//! The gates are a regression oracle: any scorer that claims to measure
//! Earth-likeness must put Earth first among the rocky planets and penalize
//! Venus, Mercury and Jupiter relative to Earth. Gate failures are reported,
//! never raised; only scorer errors abort a run.

use std::collections::BTreeMap;

use chrono::Local;
use serde::{Serialize, Serializer};

use crate::domain::FeatureVector;
use crate::error::Result;
use crate::validation::bodies::{EARTH, JUPITER, MARS, MERCURY, SOLAR_SYSTEM, VENUS};

/// What a gate asserts about the per-body scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateCheck {
    /// `winner` has the highest score among `among`.
    Argmax {
        winner: &'static str,
        among: &'static [&'static str],
    },
    /// `higher` scores strictly above `lower`.
    Greater {
        higher: &'static str,
        lower: &'static str,
    },
    /// `body / Earth < threshold`.
    RatioToEarthBelow { body: &'static str, threshold: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationGate {
    pub name: &'static str,
    pub description: &'static str,
    pub check: GateCheck,
}

const ROCKY: &[&str] = &["Mercury", "Venus", "Earth", "Mars"];

/// The fixed gate set, in report order.
pub const GATES: [ValidationGate; 5] = [
    ValidationGate {
        name: "earth_top_rocky",
        description: "Earth must rank #1 among rocky planets",
        check: GateCheck::Argmax {
            winner: EARTH.name,
            among: ROCKY,
        },
    },
    ValidationGate {
        name: "mars_gt_venus",
        description: "Mars must score higher than Venus",
        check: GateCheck::Greater {
            higher: MARS.name,
            lower: VENUS.name,
        },
    },
    ValidationGate {
        name: "venus_penalty",
        description: "Venus must be < 55% of Earth",
        check: GateCheck::RatioToEarthBelow {
            body: VENUS.name,
            threshold: 0.55,
        },
    },
    ValidationGate {
        name: "mercury_penalty",
        description: "Mercury must be < 35% of Earth",
        check: GateCheck::RatioToEarthBelow {
            body: MERCURY.name,
            threshold: 0.35,
        },
    },
    ValidationGate {
        name: "jupiter_penalty",
        description: "Jupiter must be < 50% of Earth",
        check: GateCheck::RatioToEarthBelow {
            body: JUPITER.name,
            threshold: 0.50,
        },
    },
];

/// Gate-specific evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateDetail {
    Ranking {
        /// `(body, score)` best first.
        ranking: Vec<(String, f64)>,
    },
    Difference {
        difference: f64,
    },
    Ratio {
        /// Infinite when Earth scores zero; serialized as `null`.
        #[serde(serialize_with = "finite_or_null")]
        ratio: f64,
        threshold: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateResult {
    pub name: String,
    pub description: String,
    pub pass: bool,
    pub detail: GateDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateReport {
    pub timestamp: String,
    pub scores: BTreeMap<String, f64>,
    pub gates: Vec<GateResult>,
    pub all_passed: bool,
}

impl GateReport {
    pub fn passed_count(&self) -> usize {
        self.gates.iter().filter(|g| g.pass).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &GateResult> {
        self.gates.iter().filter(|g| !g.pass)
    }
}

fn finite_or_null<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

fn score_of(scores: &BTreeMap<String, f64>, name: &str) -> f64 {
    scores.get(name).copied().unwrap_or(0.0)
}

impl ValidationGate {
    pub fn evaluate(&self, scores: &BTreeMap<String, f64>) -> GateResult {
        let (pass, detail) = match self.check {
            GateCheck::Argmax { winner, among } => {
                let mut ranking: Vec<(String, f64)> = among
                    .iter()
                    .map(|n| (n.to_string(), score_of(scores, n)))
                    .collect();
                ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                let winner_score = score_of(scores, winner);
                let pass = ranking
                    .iter()
                    .filter(|(n, _)| n != winner)
                    .all(|(_, s)| winner_score > *s);
                (pass, GateDetail::Ranking { ranking })
            }
            GateCheck::Greater { higher, lower } => {
                let difference = score_of(scores, higher) - score_of(scores, lower);
                (difference > 0.0, GateDetail::Difference { difference })
            }
            GateCheck::RatioToEarthBelow { body, threshold } => {
                let earth = score_of(scores, EARTH.name);
                let ratio = if earth > 0.0 {
                    score_of(scores, body) / earth
                } else {
                    f64::INFINITY
                };
                (ratio < threshold, GateDetail::Ratio { ratio, threshold })
            }
        };
        GateResult {
            name: self.name.to_string(),
            description: self.description.to_string(),
            pass,
            detail,
        }
    }
}

/// Score every reference body with `scorer` and evaluate the gate set.
///
/// Scorer errors propagate; gate failures are reported in the result.
pub fn run_gates<F>(scorer: F) -> Result<GateReport>
where
    F: Fn(&FeatureVector) -> Result<f64>,
{
    let mut scores = BTreeMap::new();
    for body in SOLAR_SYSTEM {
        let score = scorer(&body.features())?;
        tracing::debug!(body = body.name, score, "scored reference body");
        scores.insert(body.name.to_string(), score);
    }

    let gates: Vec<GateResult> = GATES.iter().map(|g| g.evaluate(&scores)).collect();
    let all_passed = gates.iter().all(|g| g.pass);
    for gate in gates.iter().filter(|g| !g.pass) {
        tracing::warn!(gate = %gate.name, "validation gate failed");
    }

    Ok(GateReport {
        timestamp: Local::now().to_rfc3339(),
        scores,
        gates,
        all_passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;
    use crate::reference;

    #[test]
    fn reference_formula_passes_all_gates() {
        let report = run_gates(|v| Ok(reference::score(v).score)).unwrap();
        assert!(report.all_passed, "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.passed_count(), 5);
        assert_eq!(report.scores.len(), 5);
    }

    #[test]
    fn zero_earth_fails_ratio_gates_with_null_ratio() {
        let report = run_gates(|_| Ok(0.0)).unwrap();
        assert!(!report.all_passed);
        let venus = report.gates.iter().find(|g| g.name == "venus_penalty").unwrap();
        assert!(!venus.pass);
        match &venus.detail {
            GateDetail::Ratio { ratio, .. } => assert!(ratio.is_infinite()),
            other => panic!("unexpected detail {other:?}"),
        }

        let json = serde_json::to_value(&report).unwrap();
        let ratio = &json["gates"][2]["detail"]["ratio"];
        assert!(ratio.is_null());
    }

    #[test]
    fn constant_scorer_fails_ranking() {
        let report = run_gates(|_| Ok(0.5)).unwrap();
        let top = &report.gates[0];
        assert_eq!(top.name, "earth_top_rocky");
        assert!(!top.pass);
        assert!(!report.gates[1].pass);
    }

    #[test]
    fn scorer_errors_propagate() {
        let result = run_gates(|_| Err(ScoreError::ModelInference("offline".into())));
        assert!(matches!(result, Err(ScoreError::ModelInference(_))));
    }
}
