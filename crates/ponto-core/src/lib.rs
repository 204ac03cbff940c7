//! ponto-core — Face embeddings and similarity scoring for the time clock.
//!
//! Uses SCRFD for face detection and ArcFace for face recognition,
//! both running via ONNX Runtime for CPU inference. The workflow only sees
//! the [`EmbeddingProvider`] seam and the [`similarity`] policy.

pub mod alignment;
pub mod detector;
pub mod pipeline;
pub mod provider;
pub mod recognizer;
pub mod similarity;
pub mod types;

pub use pipeline::{default_model_dir, FacePipeline};
pub use provider::{EmbeddingProvider, ProviderError};
pub use similarity::{
    decide, score, Decision, Evaluation, Evaluator, ThresholdEvaluator,
    DEFAULT_SIMILARITY_THRESHOLD,
};
pub use types::{BoundingBox, Embedding};
