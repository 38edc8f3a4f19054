//! Reporting utilities: rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::io::ingest::NamedRecord;
use crate::models::RecordScore;

/// Row indices ordered best score first. Hidden scores sort last, ties keep
/// input order.
pub fn rank_by_score(scores: &[RecordScore]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        let key = |i: usize| scores[i].score_display().unwrap_or(f64::NEG_INFINITY);
        key(b).partial_cmp(&key(a)).unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Pair inputs with their scores in ranked order.
pub fn ranked_rows<'a>(inputs: &'a [NamedRecord], scores: &'a [RecordScore]) -> Vec<(&'a NamedRecord, &'a RecordScore)> {
    rank_by_score(scores)
        .into_iter()
        .map(|i| (&inputs[i], &scores[i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SurfaceMode;
    use crate::features::FeatureSchema;
    use crate::models::{ModelAdapter, Scorer};
    use crate::validation::bodies::{EARTH, JUPITER, MARS, MERCURY};

    #[test]
    fn ranks_earth_first_and_hidden_last() {
        let scorer = Scorer::new(ModelAdapter::reference(&FeatureSchema::builtin()).unwrap()).unwrap();
        let records = vec![JUPITER.record(), MERCURY.record(), EARTH.record(), MARS.record()];
        let scores = scorer.score_table(&records, SurfaceMode::RockyOnly).unwrap();
        assert_eq!(rank_by_score(&scores), vec![2, 3, 1, 0]);
    }
}
