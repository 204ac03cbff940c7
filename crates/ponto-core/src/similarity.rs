//! Similarity scoring and the accept/reject policy for punches.

use serde::{Deserialize, Serialize};

use crate::types::Embedding;

/// Fallback threshold when the deployment does not supply one.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.80;

/// Outcome of comparing a score to the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn is_accept(self) -> bool {
        matches!(self, Decision::Accept)
    }
}

/// Dot product of two equal-length, L2-normalized vectors.
///
/// For normalized inputs this equals cosine similarity and lies in [-1, 1],
/// higher meaning more alike. Inputs are never re-normalized: with a violated
/// precondition the raw dot product comes back and is not a similarity.
pub fn score(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Accept iff `score >= threshold`.
pub fn decide(score: f32, threshold: f32) -> Decision {
    if score >= threshold {
        Decision::Accept
    } else {
        Decision::Reject
    }
}

/// A scored comparison of a probe against one reference embedding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub score: f32,
    pub decision: Decision,
}

/// Strategy for turning a probe/reference pair into an accept/reject decision.
pub trait Evaluator {
    fn evaluate(&self, probe: &Embedding, reference: &Embedding) -> Evaluation;
}

/// Dot-product evaluator with a fixed threshold.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEvaluator {
    pub threshold: f32,
}

impl ThresholdEvaluator {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl Evaluator for ThresholdEvaluator {
    fn evaluate(&self, probe: &Embedding, reference: &Embedding) -> Evaluation {
        let score = probe.score(reference);
        Evaluation {
            score,
            decision: decide(score, self.threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(v: &[f32]) -> Vec<f32> {
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / norm).collect()
    }

    #[test]
    fn test_score_identical_is_one() {
        let v = normalized(&[0.3, -1.2, 4.0, 0.5]);
        assert!((score(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_is_symmetric() {
        let v = normalized(&[0.3, -1.2, 4.0, 0.5]);
        let w = normalized(&[2.0, 0.1, -0.7, 1.5]);
        assert_eq!(score(&v, &w), score(&w, &v));
    }

    #[test]
    fn test_score_orthogonal_and_opposite() {
        assert!(score(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((score(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_does_not_renormalize() {
        // Precondition violated: raw dot product, not a similarity.
        assert_eq!(score(&[2.0, 0.0], &[3.0, 0.0]), 6.0);
    }

    #[test]
    fn test_decide_boundary_accepts() {
        assert_eq!(decide(0.80, 0.80), Decision::Accept);
        assert_eq!(decide(0.81, 0.80), Decision::Accept);
        assert_eq!(decide(0.7999, 0.80), Decision::Reject);
    }

    #[test]
    fn test_threshold_evaluator() {
        let reference = Embedding::new(vec![1.0, 0.0, 0.0]);
        let eval = ThresholdEvaluator::default();

        let same = eval.evaluate(&Embedding::new(vec![1.0, 0.0, 0.0]), &reference);
        assert!(same.decision.is_accept());
        assert!((same.score - 1.0).abs() < 1e-6);

        let other = eval.evaluate(&Embedding::new(vec![0.0, 1.0, 0.0]), &reference);
        assert_eq!(other.decision, Decision::Reject);
        assert!(other.score.abs() < 1e-6);
    }

    #[test]
    fn test_stricter_threshold_rejects_more() {
        let reference = Embedding::new(normalized(&[1.0, 0.5]));
        let probe = Embedding::new(normalized(&[1.0, 0.6]));
        let lenient = ThresholdEvaluator::new(0.80).evaluate(&probe, &reference);
        let strict = ThresholdEvaluator::new(0.9999).evaluate(&probe, &reference);
        assert!(lenient.decision.is_accept());
        assert_eq!(strict.decision, Decision::Reject);
    }
}
