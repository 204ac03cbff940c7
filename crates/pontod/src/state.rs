//! Shared request state.

use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::workflow::Workflow;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    pub auth: Arc<AuthConfig>,
    /// Maximum accepted request body, in bytes.
    pub upload_limit: usize,
}

impl AppState {
    pub fn new(workflow: Workflow, auth: AuthConfig, upload_limit: usize) -> Self {
        Self {
            workflow: Arc::new(workflow),
            auth: Arc::new(auth),
            upload_limit,
        }
    }
}
