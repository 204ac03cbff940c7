//! Response bodies.

use ponto_store::{Identity, VerificationEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySummary {
    pub id: i64,
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
}

impl From<Identity> for IdentitySummary {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            document: identity.document,
            email: identity.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchSummary {
    pub id: i64,
    pub employee_id: i64,
    pub similarity: Option<f32>,
}

impl From<VerificationEvent> for PunchSummary {
    fn from(event: VerificationEvent) -> Self {
        Self {
            id: event.id,
            employee_id: event.identity_id,
            similarity: event.score,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
