//! # Pure Data Module - Data Transfer Objects Only
//!
//! Defines the configuration data structures and the TOML → DTO mapping.
//!
//! No validation and no default values live here: a missing key maps to an
//! empty string, an empty path or `None`. The loader in the binary decides
//! what an empty value means.

use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Host (and port) used to build proxied image URLs, e.g. `localhost:28084`
    pub api_host: String,

    /// Route prefix, e.g. `/api`
    pub api_prefix: String,

    /// Route version segment, e.g. `/v1`
    pub api_version: String,

    /// Share token signing secret (may be empty - the loader decides)
    pub share_secret: String,

    /// Root directory of the filesystem object store
    pub storage_root: PathBuf,

    /// Database path
    pub database_path: PathBuf,

    /// Selection weight of the mock analyst; `None` when not configured
    pub mock_weight: Option<u32>,

    /// Selection weight of the vision analyst; `None` when not configured
    pub ai_weight: Option<u32>,

    /// OpenAI-compatible API base URL, e.g. `https://api.openai.com/v1`
    pub ai_base_url: String,

    pub ai_model: String,

    pub ai_api_key: String,

    pub ai_timeout_secs: Option<u64>,
}

fn str_at<'a>(value: &'a toml::Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path).and_then(|v| v.as_str())
}

fn int_at(value: &toml::Value, path: &[&str]) -> Option<i64> {
    lookup(value, path).and_then(|v| v.as_integer())
}

fn lookup<'a>(value: &'a toml::Value, path: &[&str]) -> Option<&'a toml::Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// **Prohibited**: This method must NOT contain any validation or default
    /// value logic. Empty strings are valid "facts". Negative or oversized
    /// integers are reported as errors since they cannot be represented.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let weight = |path: &[&str]| -> anyhow::Result<Option<u32>> {
            int_at(toml_value, path)
                .map(|w| {
                    u32::try_from(w).map_err(|_| {
                        anyhow::anyhow!("{} must be a non-negative integer, got {}", path.join("."), w)
                    })
                })
                .transpose()
        };

        let ai_timeout_secs = int_at(toml_value, &["analysts", "ai", "timeout_secs"])
            .map(|t| {
                u64::try_from(t).map_err(|_| {
                    anyhow::anyhow!("analysts.ai.timeout_secs must be non-negative, got {}", t)
                })
            })
            .transpose()?;

        Ok(Self {
            api_host: str_at(toml_value, &["api", "host"]).unwrap_or("").to_string(),
            api_prefix: str_at(toml_value, &["api", "prefix"]).unwrap_or("").to_string(),
            api_version: str_at(toml_value, &["api", "version"]).unwrap_or("").to_string(),
            share_secret: str_at(toml_value, &["share", "secret"]).unwrap_or("").to_string(),
            storage_root: PathBuf::from(str_at(toml_value, &["storage", "root"]).unwrap_or("")),
            database_path: PathBuf::from(
                str_at(toml_value, &["storage", "database_path"]).unwrap_or(""),
            ),
            mock_weight: weight(&["analysts", "mock_weight"])?,
            ai_weight: weight(&["analysts", "ai_weight"])?,
            ai_base_url: str_at(toml_value, &["analysts", "ai", "base_url"])
                .unwrap_or("")
                .to_string(),
            ai_model: str_at(toml_value, &["analysts", "ai", "model"]).unwrap_or("").to_string(),
            ai_api_key: str_at(toml_value, &["analysts", "ai", "api_key"])
                .unwrap_or("")
                .to_string(),
            ai_timeout_secs,
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            api_host: String::new(),
            api_prefix: String::new(),
            api_version: String::new(),
            share_secret: String::new(),
            storage_root: PathBuf::new(),
            database_path: PathBuf::new(),
            mock_weight: None,
            ai_weight: None,
            ai_base_url: String::new(),
            ai_model: String::new(),
            ai_api_key: String::new(),
            ai_timeout_secs: None,
        }
    }

    /// Create AppConfig with system-default paths for production use
    ///
    /// Pure data constructor: `data_dir` is computed by the caller (e.g. with
    /// the `dirs` crate).
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            storage_root: data_dir.join("objects"),
            database_path: data_dir.join("beauty-rating.db"),
            ..Self::empty()
        }
    }
}
