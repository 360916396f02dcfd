mod analysis_mapper;

pub use analysis_mapper::AnalysisRowMapper;
