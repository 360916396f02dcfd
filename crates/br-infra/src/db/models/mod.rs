mod analysis_row;

pub use analysis_row::{AnalysisChangeset, AnalysisRow, NewAnalysisRow};
