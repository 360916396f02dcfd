use std::path::{Path, PathBuf};

use anyhow::Context;

use br_app::AnalysisOrchestrator;

use super::settings::{default_data_dir, resolve_config};
use super::wiring::wire_dependencies;

pub fn data_dir_or_default(data_dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir),
        None => default_data_dir(),
    }
}

/// Resolve configuration and assemble the service.
pub fn build_orchestrator(
    config_path: Option<PathBuf>,
    data_dir: &Path,
) -> anyhow::Result<AnalysisOrchestrator> {
    let config = resolve_config(config_path, data_dir)?;
    let deps = wire_dependencies(&config).context("Failed to wire dependencies")?;
    Ok(AnalysisOrchestrator::new(deps))
}
