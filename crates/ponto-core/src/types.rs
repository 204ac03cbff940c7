use serde::{Deserialize, Serialize};

use crate::similarity;

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl BoundingBox {
    /// Box area in source-image pixels. Degenerate boxes report 0.
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Face embedding vector (512-dimensional for ArcFace), L2-normalized by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
    /// Model version that produced this embedding (e.g., "w600k_r50").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            model_version: None,
        }
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Whether two embeddings live in the same vector space: equal dimension,
    /// and the same model when both record one.
    pub fn is_compatible_with(&self, other: &Embedding) -> bool {
        let same_model = match (&self.model_version, &other.model_version) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        self.dim() == other.dim() && same_model
    }

    /// Short label such as `512-d w600k_r50`.
    pub fn describe(&self) -> String {
        match &self.model_version {
            Some(version) => format!("{}-d {version}", self.dim()),
            None => format!("{}-d", self.dim()),
        }
    }

    /// Similarity score against another embedding, see [`similarity::score`].
    pub fn score(&self, other: &Embedding) -> f32 {
        similarity::score(&self.values, &other.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_of_degenerate_box_is_zero() {
        let b = BoundingBox {
            x: 10.0, y: 10.0, width: -4.0, height: 8.0,
            confidence: 0.9, landmarks: None,
        };
        assert_eq!(b.area(), 0.0);
    }

    #[test]
    fn test_embedding_score_is_dot_product() {
        let a = Embedding::new(vec![0.6, 0.8, 0.0]);
        let b = Embedding::new(vec![0.8, 0.6, 0.0]);
        assert!((a.score(&b) - 0.96).abs() < 1e-6);
        assert_eq!(a.dim(), 3);
    }

    #[test]
    fn test_compatibility_checks_dimension_and_model() {
        let r50 = Embedding::new(vec![1.0, 0.0]).with_model_version("w600k_r50");
        let mbf = Embedding::new(vec![1.0, 0.0]).with_model_version("w600k_mbf");
        let unversioned = Embedding::new(vec![0.0, 1.0]);

        assert!(r50.is_compatible_with(&r50.clone()));
        assert!(!r50.is_compatible_with(&mbf));
        assert!(r50.is_compatible_with(&unversioned));
        assert!(!unversioned.is_compatible_with(&Embedding::new(vec![1.0])));
        assert_eq!(r50.describe(), "2-d w600k_r50");
        assert_eq!(unversioned.describe(), "2-d");
    }
}
