//! Beauty Rating: score portrait photos with pluggable analysts, keep the
//! results per user and share them through signed links.

pub mod bootstrap;
pub mod cli;

pub use cli::{execute, Cli, CommandError, Commands};
