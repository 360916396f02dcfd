//! # Application Dependencies
//!
//! Dependency grouping for [`AnalysisOrchestrator`](crate::AnalysisOrchestrator)
//! construction.
//!
//! **Note**: This is NOT a Builder pattern.
//! - No build steps
//! - No default values
//! - No hidden logic
//! - Just parameter grouping

use std::sync::Arc;

use rand::RngCore;

use br_core::ports::*;
use br_core::security::ShareTokenCodec;

use crate::analyst_registry::AnalystRegistry;
use crate::usecases::internal::ApiRoute;

/// Application dependency grouping (non-Builder, just parameter grouping)
///
/// All dependencies are required - no defaults, no optional fields.
pub struct AppDeps {
    // Persistence
    pub analysis_repo: Arc<dyn AnalysisRepositoryPort>,

    // Storage
    pub object_storage: Arc<dyn ObjectStoragePort>,
    pub api_route: ApiRoute,

    // Analysis
    pub analysts: Arc<AnalystRegistry>,
    pub percentile_rng: Box<dyn RngCore + Send>,

    // Sharing
    pub share_codec: Arc<ShareTokenCodec>,

    // System
    pub clock: Arc<dyn ClockPort>,
}
