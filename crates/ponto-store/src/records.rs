//! Persisted record types.

use chrono::{DateTime, Utc};
use ponto_core::Embedding;
use serde::{Deserialize, Serialize};

pub type IdentityId = i64;
pub type EventId = i64;

/// A registered employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    /// Current reference embedding; replaced wholesale on re-enrollment.
    pub reference: Option<Embedding>,
    /// Path of the current enrollment image.
    pub photo_path: Option<String>,
}

impl Identity {
    pub fn is_enrolled(&self) -> bool {
        self.reference.is_some()
    }
}

/// Attributes supplied when enrolling a new employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewIdentity {
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
}

/// One recorded punch attempt that reached scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationEvent {
    pub id: EventId,
    pub identity_id: IdentityId,
    pub timestamp: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub score: Option<f32>,
    pub photo_path: Option<String>,
}

/// Event fields before the database assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVerificationEvent {
    pub identity_id: IdentityId,
    pub timestamp: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub score: Option<f32>,
    pub photo_path: Option<String>,
}

impl NewVerificationEvent {
    pub(crate) fn with_id(self, id: EventId) -> VerificationEvent {
        VerificationEvent {
            id,
            identity_id: self.identity_id,
            timestamp: self.timestamp,
            lat: self.lat,
            lon: self.lon,
            score: self.score,
            photo_path: self.photo_path,
        }
    }
}
