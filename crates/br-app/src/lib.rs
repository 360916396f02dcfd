//! Beauty Rating application layer
//!
//! Use cases over the core ports, the weighted analyst registry and the
//! orchestrator facade that maps failures to client-facing errors.

pub mod analyst_registry;
pub mod deps;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod usecases;

#[cfg(test)]
pub(crate) mod test_support;

pub use analyst_registry::{AnalystRegistry, RegistryError};
pub use deps::AppDeps;
pub use errors::{ServiceError, UseCaseError};
pub use models::{AnalysisView, ScoreDetailView};
pub use orchestrator::AnalysisOrchestrator;
pub use usecases::internal::{ApiRoute, PRESIGN_TTL};
