//! The embedding-provider seam between captured images and the workflow.

use async_trait::async_trait;
use thiserror::Error;

use crate::detector::DetectorError;
use crate::recognizer::RecognizerError;
use crate::types::Embedding;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("image could not be decoded: {0}")]
    InvalidImage(String),
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer error: {0}")]
    Recognizer(#[from] RecognizerError),
    #[error("embedding engine unavailable")]
    Unavailable,
}

/// Turns an uploaded image into one normalized embedding.
///
/// `Ok(None)` means the image decoded but no face was found. When several
/// faces are present the provider embeds the largest one.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, image: &[u8]) -> Result<Option<Embedding>, ProviderError>;
}
