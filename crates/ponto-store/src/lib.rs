//! ponto-store — Persistence for the time clock.
//!
//! SQLite tables for employees and punch audit records, a UUID-addressed
//! photo directory, and the CSV export of the audit trail.

pub mod db;
pub mod error;
pub mod export;
pub mod images;
pub mod records;

pub use db::RecordStore;
pub use error::{StoreError, StoreResult};
pub use export::events_to_csv;
pub use images::ImageStore;
pub use records::{
    EventId, Identity, IdentityId, NewIdentity, NewVerificationEvent, VerificationEvent,
};
