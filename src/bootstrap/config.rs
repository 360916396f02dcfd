//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read TOML configuration files / 读取 TOML 配置文件
//! - ✅ Parse TOML into AppConfig DTO / 将 TOML 解析为 AppConfig DTO
//! - ✅ Report I/O and parsing errors with context / 报告带上下文的 I/O 和解析错误
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No validation logic / 禁止验证逻辑**
//! ❌ **No default value logic / 禁止默认值逻辑**
//!
//! Defaults, environment overrides and validation live in
//! [`settings`](super::settings).

use anyhow::Context;
use std::path::PathBuf;
use br_core::config::AppConfig;

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// **NO validation is performed**: empty strings, missing sections and zero
/// weights are accepted as facts.
///
/// # Errors / 错误
///
/// - File cannot be read (I/O error)
/// - Content is not valid TOML (parse error)
/// - A weight or timeout is negative (mapping error)
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}
