//! Business logic use cases
//!
//! One struct per user-facing operation. Each holds only the ports it needs
//! and exposes a single `execute`.

pub mod analyze_image;
pub mod delete_analysis;
pub mod get_analysis_image;
pub mod internal;
pub mod list_analyses;
pub mod resolve_shared_analysis;
pub mod set_favorite;
pub mod share_analysis;

pub use analyze_image::AnalyzeImage;
pub use delete_analysis::DeleteAnalysis;
pub use get_analysis_image::GetAnalysisImage;
pub use list_analyses::{AnalysisFilter, ListAnalyses};
pub use resolve_shared_analysis::ResolveSharedAnalysis;
pub use set_favorite::SetFavorite;
pub use share_analysis::ShareAnalysis;
