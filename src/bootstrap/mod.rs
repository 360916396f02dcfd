pub mod config;
pub mod run;
pub mod settings;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use run::{build_orchestrator, data_dir_or_default};
pub use settings::resolve_config;
pub use wiring::{wire_dependencies, WiringError};
