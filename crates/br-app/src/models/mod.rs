mod analysis_view;

pub use analysis_view::{AnalysisView, ScoreDetailView};
