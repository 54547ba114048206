//! Top-k Crop Ranking
//!
//! Turns the model's class distribution into the three recommendations shown
//! to the user. Probabilities are paired with their labels explicitly before
//! ranking, so a model whose output length disagrees with its label list is
//! reported instead of silently shifting names onto the wrong scores.
//!
//! Ordering: descending by probability. Equal probabilities keep their label
//! order (lowest index first).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::labels::capitalize;
use crate::season::round_to_tenth;

/// Number of recommendations returned per prediction
pub const TOP_K: usize = 3;

/// Broken agreement between a model's outputs and its label list
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    #[error("model returned {probabilities} probabilities for {labels} labels")]
    LabelMismatch { labels: usize, probabilities: usize },

    #[error("ranking needs at least {needed} classes, model provides {available}")]
    TooFewClasses { needed: usize, available: usize },

    #[error("model returned non-finite probability {value} for {label}")]
    NonFiniteProbability { label: String, value: f64 },
}

/// A class probability tied to the label it belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledProbability<'a> {
    pub label: &'a str,
    pub probability: f64,
}

/// One ranked crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Capitalized crop name
    pub crop: String,
    /// Probability as a percentage, 1 decimal
    pub confidence: f64,
}

impl Recommendation {
    fn from_entry(entry: &LabeledProbability<'_>) -> Self {
        Recommendation {
            crop: capitalize(entry.label),
            confidence: to_confidence(entry.probability),
        }
    }
}

/// Probability → percentage rounded to 1 decimal
pub fn to_confidence(probability: f64) -> f64 {
    round_to_tenth(probability * 100.0)
}

/// Zip labels with probabilities, rejecting length mismatches
pub fn pair_labels<'a, S: AsRef<str>>(
    labels: &'a [S],
    probabilities: &[f64],
) -> Result<Vec<LabeledProbability<'a>>, ContractError> {
    if labels.len() != probabilities.len() {
        return Err(ContractError::LabelMismatch {
            labels: labels.len(),
            probabilities: probabilities.len(),
        });
    }

    Ok(labels
        .iter()
        .zip(probabilities)
        .map(|(label, &probability)| LabeledProbability {
            label: label.as_ref(),
            probability,
        })
        .collect())
}

/// Top `k` entries, highest probability first
pub fn rank_top_k(
    entries: &[LabeledProbability<'_>],
    k: usize,
) -> Result<Vec<Recommendation>, ContractError> {
    if entries.len() < k {
        return Err(ContractError::TooFewClasses {
            needed: k,
            available: entries.len(),
        });
    }

    // Index buffer stays on the stack for the stock 22-class model
    let mut order: SmallVec<[usize; 32]> = (0..entries.len()).collect();

    // sort_by is stable: equal probabilities keep ascending index order
    order.sort_by(|&a, &b| entries[b].probability.total_cmp(&entries[a].probability));

    Ok(order
        .iter()
        .take(k)
        .map(|&idx| Recommendation::from_entry(&entries[idx]))
        .collect())
}

/// Top `TOP_K` recommendations
pub fn rank(entries: &[LabeledProbability<'_>]) -> Result<Vec<Recommendation>, ContractError> {
    rank_top_k(entries, TOP_K)
}

/// Rank a bare probability vector whose index i belongs to `labels[i]`
pub fn rank_positional<S: AsRef<str>>(
    probabilities: &[f64],
    labels: &[S],
) -> Result<Vec<Recommendation>, ContractError> {
    let entries = pair_labels(labels, probabilities)?;
    rank(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::CROP_LABELS;
    use approx::assert_relative_eq;
    use rand::Rng;

    fn rice_heavy_vector() -> Vec<f64> {
        // 0.7 on rice, remaining 0.3 spread thinly over the other 21 crops
        let mut probs = vec![0.3 / 21.0; CROP_LABELS.len()];
        probs[20] = 0.7;
        probs
    }

    #[test]
    fn test_single_maximum_at_rice() {
        let recs = rank_positional(&rice_heavy_vector(), &CROP_LABELS).unwrap();

        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].crop, "Rice");
        assert_relative_eq!(recs[0].confidence, 70.0);
        assert_relative_eq!(recs[1].confidence, 1.4);
    }

    #[test]
    fn test_descending_order() {
        let mut probs = vec![0.0; CROP_LABELS.len()];
        probs[3] = 0.2; // chickpea
        probs[11] = 0.5; // maize
        probs[7] = 0.3; // grapes

        let recs = rank_positional(&probs, &CROP_LABELS).unwrap();
        let crops: Vec<&str> = recs.iter().map(|r| r.crop.as_str()).collect();
        assert_eq!(crops, vec!["Maize", "Grapes", "Chickpea"]);
        assert_relative_eq!(recs[0].confidence, 50.0);
        assert_relative_eq!(recs[1].confidence, 30.0);
        assert_relative_eq!(recs[2].confidence, 20.0);
    }

    #[test]
    fn test_ties_prefer_lowest_index() {
        let mut probs = vec![0.01; CROP_LABELS.len()];
        probs[2] = 0.25; // blackgram
        probs[9] = 0.25; // kidneybeans
        probs[15] = 0.25; // muskmelon
        probs[18] = 0.25; // pigeonpeas

        let recs = rank_positional(&probs, &CROP_LABELS).unwrap();
        let crops: Vec<&str> = recs.iter().map(|r| r.crop.as_str()).collect();
        assert_eq!(crops, vec!["Blackgram", "Kidneybeans", "Muskmelon"]);
    }

    #[test]
    fn test_unnormalized_scores_are_accepted() {
        let labels = ["a", "b", "c", "d"];
        let recs = rank_positional(&[2.0, 0.0, 5.0, 1.0], &labels).unwrap();
        assert_eq!(recs[0].crop, "C");
        assert_relative_eq!(recs[0].confidence, 500.0);
    }

    #[test]
    fn test_length_mismatch_is_contract_error() {
        let err = rank_positional(&[0.5, 0.3, 0.2], &CROP_LABELS).unwrap_err();
        assert_eq!(
            err,
            ContractError::LabelMismatch { labels: 22, probabilities: 3 }
        );
    }

    #[test]
    fn test_too_few_classes_is_contract_error() {
        let labels = ["rice", "maize"];
        let err = rank_positional(&[0.6, 0.4], &labels).unwrap_err();
        assert_eq!(err, ContractError::TooFewClasses { needed: 3, available: 2 });
    }

    #[test]
    fn test_exactly_three_classes() {
        let labels = ["jute", "rice", "maize"];
        let recs = rank_positional(&[0.1, 0.6, 0.3], &labels).unwrap();
        let crops: Vec<&str> = recs.iter().map(|r| r.crop.as_str()).collect();
        assert_eq!(crops, vec!["Rice", "Maize", "Jute"]);
    }

    #[test]
    fn test_confidence_rounding() {
        assert_relative_eq!(to_confidence(0.123456), 12.3);
        assert_relative_eq!(to_confidence(0.98765), 98.8);
        assert_relative_eq!(to_confidence(1.0), 100.0);
        assert_relative_eq!(to_confidence(0.0), 0.0);
        // 0.135 is stored just below the midpoint
        assert_eq!(to_confidence(0.00135), 0.1);
    }

    #[test]
    fn test_nan_scores_keep_a_total_order() {
        let labels = ["a", "b", "c", "d", "e"];
        let probs = [0.2, f64::NAN, 0.5, -f64::NAN, 0.3];

        let recs = rank_positional(&probs, &labels).unwrap();
        assert_eq!(recs.len(), 3);
        // Positive NaN sorts above every number, negative NaN below
        assert_eq!(recs[0].crop, "B");
        assert_eq!(recs[1].crop, "C");
        assert_eq!(recs[2].crop, "E");
    }

    #[test]
    fn test_random_distributions_rank_consistently() {
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let raw: Vec<f64> = (0..CROP_LABELS.len()).map(|_| rng.gen::<f64>()).collect();
            let total: f64 = raw.iter().sum();
            let probs: Vec<f64> = raw.iter().map(|p| p / total).collect();

            let recs = rank_positional(&probs, &CROP_LABELS).unwrap();
            assert_eq!(recs.len(), TOP_K);

            for pair in recs.windows(2) {
                assert!(pair[0].confidence >= pair[1].confidence);
            }
            for rec in &recs {
                assert!((0.0..=100.0).contains(&rec.confidence));
            }

            // Top pick is the argmax
            let max = probs.iter().cloned().fold(f64::MIN, f64::max);
            assert_relative_eq!(recs[0].confidence, to_confidence(max));
        }
    }
}
