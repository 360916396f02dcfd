//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases and the adapters in
//! `br-infra`. Use cases hold them as `Arc<dyn Port>` and never see a concrete
//! backend.

pub mod analysis_repository;
mod analyst;
mod clock;
pub mod errors;
mod object_storage;

pub use analysis_repository::AnalysisRepositoryPort;
pub use analyst::AnalystPort;
pub use clock::*;
pub use errors::{AnalysisRepositoryError, AnalystError};
pub use object_storage::ObjectStoragePort;
