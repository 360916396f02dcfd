//! Turn the raw [`AppConfig`] facts into the settings the service runs with.
//!
//! Order: file values, then environment overrides, then defaults for
//! whatever is still empty, then validation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{debug, info};

use br_core::config::AppConfig;

use super::config::load_config;

pub const APP_DIR_NAME: &str = "beauty-rating";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_SHARE_SECRET: &str = "BR_SHARE_SECRET";
pub const ENV_AI_API_KEY: &str = "BR_AI_API_KEY";

pub const DEFAULT_API_HOST: &str = "localhost:28084";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_API_VERSION: &str = "/v1";
pub const DEFAULT_MOCK_WEIGHT: u32 = 1;
pub const DEFAULT_AI_WEIGHT: u32 = 0;
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// Per-user data directory, e.g. `~/.local/share/beauty-rating` on Linux.
pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_local_dir().context("Failed to locate the local data directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Load, override, default and validate.
///
/// An explicit `config_path` must exist. Without one, `<data_dir>/config.toml`
/// is read when present and an all-defaults configuration is used otherwise.
pub fn resolve_config(config_path: Option<PathBuf>, data_dir: &Path) -> anyhow::Result<AppConfig> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => {
            let implicit = data_dir.join(CONFIG_FILE_NAME);
            if implicit.is_file() {
                load_config(implicit)?
            } else {
                debug!(path = %implicit.display(), "no config file, using defaults");
                AppConfig::empty()
            }
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    let config = apply_defaults(config, data_dir);
    validate(&config)?;

    info!(
        api_host = %config.api_host,
        database = %config.database_path.display(),
        storage_root = %config.storage_root.display(),
        mock_weight = ?config.mock_weight,
        ai_weight = ?config.ai_weight,
        "configuration resolved"
    );

    Ok(config)
}

/// Non-empty environment values replace the file's secrets.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = lookup(ENV_SHARE_SECRET).filter(|v| !v.is_empty()) {
        config.share_secret = secret;
    }
    if let Some(key) = lookup(ENV_AI_API_KEY).filter(|v| !v.is_empty()) {
        config.ai_api_key = key;
    }
}

/// Fill every empty value. The share secret stays empty when unset; wiring
/// generates a per-process one in that case.
pub fn apply_defaults(config: AppConfig, data_dir: &Path) -> AppConfig {
    let system = AppConfig::with_system_defaults(data_dir.to_path_buf());

    fn or_default(value: String, default: &str) -> String {
        if value.trim().is_empty() {
            default.to_string()
        } else {
            value
        }
    }

    AppConfig {
        api_host: or_default(config.api_host, DEFAULT_API_HOST),
        api_prefix: or_default(config.api_prefix, DEFAULT_API_PREFIX),
        api_version: or_default(config.api_version, DEFAULT_API_VERSION),
        share_secret: config.share_secret,
        storage_root: if config.storage_root.as_os_str().is_empty() {
            system.storage_root
        } else {
            config.storage_root
        },
        database_path: if config.database_path.as_os_str().is_empty() {
            system.database_path
        } else {
            config.database_path
        },
        mock_weight: Some(config.mock_weight.unwrap_or(DEFAULT_MOCK_WEIGHT)),
        ai_weight: Some(config.ai_weight.unwrap_or(DEFAULT_AI_WEIGHT)),
        ai_base_url: or_default(config.ai_base_url, DEFAULT_AI_BASE_URL),
        ai_model: or_default(config.ai_model, DEFAULT_AI_MODEL),
        ai_api_key: config.ai_api_key,
        ai_timeout_secs: Some(config.ai_timeout_secs.unwrap_or(DEFAULT_AI_TIMEOUT_SECS)),
    }
}

pub fn validate(config: &AppConfig) -> anyhow::Result<()> {
    let mock_weight = config.mock_weight.unwrap_or_default();
    let ai_weight = config.ai_weight.unwrap_or_default();

    if mock_weight == 0 && ai_weight == 0 {
        bail!("at least one of analysts.mock_weight and analysts.ai_weight must be positive");
    }
    if ai_weight > 0 && config.ai_api_key.trim().is_empty() {
        bail!(
            "analysts.ai_weight is {} but no API key is configured (set analysts.ai.api_key or {})",
            ai_weight,
            ENV_AI_API_KEY
        );
    }
    if config.ai_timeout_secs == Some(0) {
        bail!("analysts.ai.timeout_secs must be positive");
    }
    for (name, value) in [
        ("api.prefix", &config.api_prefix),
        ("api.version", &config.api_version),
    ] {
        if !value.starts_with('/') {
            bail!("{} must start with '/', got {:?}", name, value);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_an_empty_config() {
        let config = apply_defaults(AppConfig::empty(), Path::new("/data/br"));

        assert_eq!(config.api_host, DEFAULT_API_HOST);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.api_version, "/v1");
        assert_eq!(config.storage_root, PathBuf::from("/data/br/objects"));
        assert_eq!(config.database_path, PathBuf::from("/data/br/beauty-rating.db"));
        assert_eq!(config.mock_weight, Some(1));
        assert_eq!(config.ai_weight, Some(0));
        assert_eq!(config.ai_timeout_secs, Some(60));
        assert!(config.share_secret.is_empty());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn defaults_keep_configured_values() {
        let config = AppConfig {
            api_host: "rating.example.com".to_string(),
            mock_weight: Some(0),
            ai_weight: Some(4),
            ai_api_key: "sk-x".to_string(),
            ..AppConfig::empty()
        };

        let config = apply_defaults(config, Path::new("/data/br"));

        assert_eq!(config.api_host, "rating.example.com");
        assert_eq!(config.mock_weight, Some(0));
        assert_eq!(config.ai_weight, Some(4));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn environment_overrides_file_secrets() {
        let mut config = AppConfig {
            share_secret: "from-file".to_string(),
            ai_api_key: "sk-file".to_string(),
            ..AppConfig::empty()
        };

        apply_env_overrides(
            &mut config,
            env(&[(ENV_SHARE_SECRET, "from-env"), (ENV_AI_API_KEY, "")]),
        );

        assert_eq!(config.share_secret, "from-env");
        assert_eq!(config.ai_api_key, "sk-file");
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let config = apply_defaults(
            AppConfig {
                mock_weight: Some(0),
                ..AppConfig::empty()
            },
            Path::new("/d"),
        );

        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn vision_analyst_needs_an_api_key() {
        let config = apply_defaults(
            AppConfig {
                ai_weight: Some(1),
                ..AppConfig::empty()
            },
            Path::new("/d"),
        );

        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains(ENV_AI_API_KEY));
    }

    #[test]
    fn route_segments_must_be_absolute() {
        let config = apply_defaults(
            AppConfig {
                api_prefix: "api".to_string(),
                ..AppConfig::empty()
            },
            Path::new("/d"),
        );

        assert!(validate(&config).is_err());
    }

    #[test]
    fn implicit_config_file_is_read_from_data_dir() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[api]\nhost = \"img.example.com\"").unwrap();

        let config = resolve_config(None, dir.path()).unwrap();

        assert_eq!(config.api_host, "img.example.com");
        assert_eq!(config.database_path, dir.path().join("beauty-rating.db"));
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();

        let result = resolve_config(Some(dir.path().join("absent.toml")), dir.path());

        assert!(result.is_err());
    }
}
