//! pontod — face-verified punch clock daemon.
//!
//! Enrollment and punch verification run through [`workflow::Workflow`];
//! embeddings come from a dedicated engine thread ([`engine`]) and records
//! from `ponto-store`. The HTTP surface lives in [`routes`].

pub mod auth;
pub mod config;
pub mod dto;
pub mod engine;
pub mod error;
pub mod routes;
pub mod state;
pub mod workflow;

pub use routes::create_router;
pub use state::AppState;
