//! Enrollment and punch verification.
//!
//! Detection and configuration problems fail before anything is written.
//! A genuine mismatch is written first and rejected afterwards, so every
//! scored punch leaves an audit record.

use std::sync::Arc;

use chrono::Utc;
use ponto_core::{EmbeddingProvider, Evaluator, ProviderError, ThresholdEvaluator};
use ponto_store::{
    EventId, Identity, IdentityId, ImageStore, NewIdentity, NewVerificationEvent, RecordStore,
    StoreError, VerificationEvent,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("no face detected in the image")]
    NoFaceDetected,
    #[error("employee {0} not found")]
    IdentityNotFound(IdentityId),
    #[error("employee {0} has no enrolled face")]
    NotEnrolled(IdentityId),
    #[error("face recognition failed (similarity={score:.2})")]
    RecognitionFailed { score: f32, event_id: EventId },
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("reference embedding is {reference} but probe is {probe}; re-enroll the employee")]
    IncompatibleEmbedding { reference: String, probe: String },
    #[error("duplicate employee: {0}")]
    DuplicateIdentity(String),
    #[error("embedding engine unavailable: {0}")]
    EmbeddingUnavailable(String),
    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(reason) => WorkflowError::DuplicateIdentity(reason),
            other => WorkflowError::Storage(other),
        }
    }
}

impl From<ProviderError> for WorkflowError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidImage(reason) => WorkflowError::InvalidImage(reason),
            other => WorkflowError::EmbeddingUnavailable(other.to_string()),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Optional coordinates reported with a punch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Location {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

pub struct Workflow {
    provider: Arc<dyn EmbeddingProvider>,
    records: RecordStore,
    images: ImageStore,
    evaluator: ThresholdEvaluator,
}

impl Workflow {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        records: RecordStore,
        images: ImageStore,
        evaluator: ThresholdEvaluator,
    ) -> Self {
        Self {
            provider,
            records,
            images,
            evaluator,
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn threshold(&self) -> f32 {
        self.evaluator.threshold
    }

    /// Register a new employee with the face in `image` as reference.
    pub async fn enroll(&self, new: NewIdentity, image: &[u8]) -> WorkflowResult<Identity> {
        let reference = self
            .provider
            .embed(image)
            .await?
            .ok_or(WorkflowError::NoFaceDetected)?;

        let photo_path = self.images.save(image).await?;
        let identity = self.records.insert_identity(new, &reference, &photo_path).await?;

        tracing::info!(id = identity.id, name = %identity.name, "employee enrolled");
        Ok(identity)
    }

    /// Replace an employee's reference with the face in `image`.
    ///
    /// The previous enrollment photo stays on disk.
    pub async fn re_enroll(&self, id: IdentityId, image: &[u8]) -> WorkflowResult<Identity> {
        if self.records.get_identity(id).await?.is_none() {
            return Err(WorkflowError::IdentityNotFound(id));
        }

        let reference = self
            .provider
            .embed(image)
            .await?
            .ok_or(WorkflowError::NoFaceDetected)?;

        let photo_path = self.images.save(image).await?;
        let identity = self
            .records
            .replace_reference(id, &reference, &photo_path)
            .await?
            .ok_or(WorkflowError::IdentityNotFound(id))?;

        tracing::info!(id, "employee re-enrolled");
        Ok(identity)
    }

    /// Verify a punch for `id` against its reference embedding.
    pub async fn verify(
        &self,
        id: IdentityId,
        image: &[u8],
        location: Location,
    ) -> WorkflowResult<VerificationEvent> {
        let identity = self
            .records
            .get_identity(id)
            .await?
            .ok_or(WorkflowError::IdentityNotFound(id))?;

        let probe = self
            .provider
            .embed(image)
            .await?
            .ok_or(WorkflowError::NoFaceDetected)?;

        let reference = identity.reference.ok_or(WorkflowError::NotEnrolled(id))?;
        if !reference.is_compatible_with(&probe) {
            return Err(WorkflowError::IncompatibleEmbedding {
                reference: reference.describe(),
                probe: probe.describe(),
            });
        }

        let evaluation = self.evaluator.evaluate(&probe, &reference);

        // Recorded before the decision is applied.
        let photo_path = self.images.save(image).await?;
        let event = self
            .records
            .insert_event(NewVerificationEvent {
                identity_id: id,
                timestamp: Utc::now(),
                lat: location.lat,
                lon: location.lon,
                score: Some(evaluation.score),
                photo_path: Some(photo_path),
            })
            .await?;

        if !evaluation.decision.is_accept() {
            tracing::warn!(
                id,
                event_id = event.id,
                score = evaluation.score,
                threshold = self.evaluator.threshold,
                "punch rejected"
            );
            return Err(WorkflowError::RecognitionFailed {
                score: evaluation.score,
                event_id: event.id,
            });
        }

        tracing::info!(id, event_id = event.id, score = evaluation.score, "punch accepted");
        Ok(event)
    }
}
