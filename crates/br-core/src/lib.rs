//! # br-core
//!
//! Core domain models and business logic for Beauty Rating.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod analysis;
pub mod config;
pub mod ids;
pub mod ports;
pub mod security;
pub mod selection;
pub mod storage;

// Re-export commonly used types at the crate root
pub use analysis::{AnalysisResult, AnalystReport, AnalystType, NewAnalysis, ScoreDetail, TaggedReport};
pub use config::AppConfig;
pub use ids::{AnalysisId, UserId};
pub use security::{ShareSecret, ShareToken, ShareTokenCodec, ShareTokenError};
pub use selection::WeightedPicker;
pub use storage::ObjectKey;
