//! Score aggregation
//!
//! Two weighted means live here:
//!
//! 1. **Signal aggregation**: each modality engine produces a fixed set of
//!    named signals in [0,1]. `aggregate` combines them with the modality's
//!    weight table into one AI score.
//!
//! 2. **Detector fusion**: the internal engine's score is one opinion among
//!    possibly several (Hive, GPTZero, OpenAI). `fuse` combines them using a
//!    per-detector reliability weight.
//!
//! Weight tables are `const` and sum to 1.0 per modality.

use crate::classify::ContentCategory;

/// Signal name -> weight
pub type WeightTable = &'static [(&'static str, f64)];

/// Name the internal forensic engine reports under
pub const INTERNAL_DETECTOR: &str = "humanmark";

/// Detector reliability weights (empirical)
pub const DETECTOR_WEIGHTS: &[(&str, f64)] = &[
    (INTERNAL_DETECTOR, 1.0),
    ("hive", 1.2),
    ("gptzero", 1.1),
    ("openai", 0.9),
];

/// Weighted mean of the signals that have a weight, clamped to [0,1]
pub fn aggregate(signals: &[(&str, f64)], weights: WeightTable) -> f64 {
    let mut score = 0.0;
    let mut total = 0.0;

    for (name, value) in signals {
        if let Some(w) = weight_of(weights, name) {
            score += value * w;
            total += w;
        }
    }

    if total <= 0.0 {
        return 0.5;
    }

    (score / total).clamp(0.0, 1.0)
}

pub fn weights_sum(weights: WeightTable) -> f64 {
    weights.iter().map(|(_, w)| w).sum()
}

fn weight_of(weights: &[(&str, f64)], name: &str) -> Option<f64> {
    weights.iter().find(|(n, _)| *n == name).map(|(_, w)| *w)
}

/// Reliability weight of a detector for a content category
///
/// Hive's media models outperform its text model, so media categories
/// override the base table.
pub fn detector_weight(detector: &str, category: ContentCategory) -> f64 {
    match (detector, category) {
        ("hive", ContentCategory::Image) | ("hive", ContentCategory::Audio) => 1.3,
        ("hive", ContentCategory::Video) => 1.4,
        _ => weight_of(DETECTOR_WEIGHTS, detector).unwrap_or(1.0),
    }
}

/// A single detector's AI-probability
#[derive(Debug, Clone, PartialEq)]
pub struct Opinion {
    pub detector: String,
    pub score: f64,
}

impl Opinion {
    pub fn new(detector: impl Into<String>, score: f64) -> Self {
        Self { detector: detector.into(), score }
    }
}

/// Fuse detector opinions into one score
pub fn fuse(opinions: &[Opinion], category: ContentCategory) -> f64 {
    let mut score = 0.0;
    let mut total = 0.0;

    for op in opinions {
        let w = detector_weight(&op.detector, category);
        score += op.score * w;
        total += w;
    }

    if total <= 0.0 {
        return 0.5;
    }

    (score / total).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: WeightTable = &[("a", 0.5), ("b", 0.3), ("c", 0.2)];

    #[test]
    fn test_aggregate_weighted_mean() {
        let score = aggregate(&[("a", 1.0), ("b", 0.0), ("c", 0.5)], TABLE);
        assert!((score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_ignores_unweighted_signals() {
        let score = aggregate(&[("a", 1.0), ("zzz", 0.0)], TABLE);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_empty_is_neutral() {
        assert_eq!(aggregate(&[], TABLE), 0.5);
        assert_eq!(aggregate(&[("a", 1.0)], &[]), 0.5);
    }

    #[test]
    fn test_aggregate_stays_in_unit_interval() {
        // Out-of-range inputs still come out clamped
        for v in [-3.0, -0.1, 0.0, 0.4, 1.0, 1.7, 42.0] {
            let score = aggregate(&[("a", v), ("b", v), ("c", v)], TABLE);
            assert!((0.0..=1.0).contains(&score), "{} -> {}", v, score);
        }
    }

    #[test]
    fn test_fuse_single_internal_opinion_is_identity() {
        let ops = vec![Opinion::new(INTERNAL_DETECTOR, 0.73)];
        assert!((fuse(&ops, ContentCategory::Text) - 0.73).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_weights_by_reliability() {
        // (0.2*1.0 + 0.8*1.2) / 2.2
        let ops = vec![Opinion::new("humanmark", 0.2), Opinion::new("hive", 0.8)];
        let expected = (0.2 + 0.8 * 1.2) / 2.2;
        assert!((fuse(&ops, ContentCategory::Text) - expected).abs() < 1e-9);

        // Hive counts more on video
        let expected_video = (0.2 + 0.8 * 1.4) / 2.4;
        assert!((fuse(&ops, ContentCategory::Video) - expected_video).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_unknown_detector_weight_one() {
        assert_eq!(detector_weight("somebody", ContentCategory::Text), 1.0);
    }

    #[test]
    fn test_fuse_empty_is_neutral() {
        assert_eq!(fuse(&[], ContentCategory::Image), 0.5);
    }
}
