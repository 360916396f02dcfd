//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (db, object store, analysts) / 创建 infra 层具体实现
//! - ✅ Inject all dependencies into [`AppDeps`] / 将所有依赖注入到 AppDeps
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! ❌ **No configuration validation / 禁止做配置验证**
//! - Config is already resolved in `settings.rs`
//!
//! ## Architecture Principle / 架构原则
//!
//! > **This is the only place allowed to depend on br-infra + br-app simultaneously.**
//! > **这是唯一允许同时依赖 br-infra 和 br-app 的地方。**

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;
use tracing::{info, warn};

use br_app::{AnalystRegistry, ApiRoute, AppDeps};
use br_core::config::AppConfig;
use br_core::ports::{AnalysisRepositoryPort, AnalystPort, ClockPort, ObjectStoragePort};
use br_core::security::{ShareSecret, ShareTokenCodec};
use br_infra::analyst::{MockAnalyst, VisionAnalyst, VisionAnalystConfig};
use br_infra::db::repositories::DieselAnalysisRepository;
use br_infra::db::{init_db_pool, DbPool, DieselSqliteExecutor};
use br_infra::storage::FsObjectStore;
use br_infra::SystemClock;

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    #[error("Object storage initialization failed: {0}")]
    ObjectStorageInit(String),

    #[error("Analyst initialization failed: {0}")]
    AnalystInit(String),
}

/// Create SQLite database connection pool
/// 创建 SQLite 数据库连接池
///
/// # Errors / 错误
///
/// Returns `WiringError::DatabaseInit` if:
/// - Parent directory creation fails / 父目录创建失败
/// - Database pool creation fails / 数据库池创建失败
/// - Migration fails / 迁移失败
fn create_db_pool(db_path: &Path) -> WiringResult<DbPool> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            WiringError::DatabaseInit(format!("Failed to create DB directory: {}", e))
        })?;
    }

    let db_url = db_path
        .to_str()
        .ok_or_else(|| WiringError::DatabaseInit("Invalid database path".to_string()))?;

    init_db_pool(db_url)
        .map_err(|e| WiringError::DatabaseInit(format!("Failed to initialize DB: {:#}", e)))
}

fn create_object_storage(
    root: &Path,
    clock: Arc<dyn ClockPort>,
) -> WiringResult<Arc<dyn ObjectStoragePort>> {
    std::fs::create_dir_all(root).map_err(|e| {
        WiringError::ObjectStorageInit(format!(
            "Failed to create storage root {}: {}",
            root.display(),
            e
        ))
    })?;
    Ok(Arc::new(FsObjectStore::new(root.to_path_buf(), clock)))
}

/// Analysts with their selection weights. The vision analyst is only
/// registered when it can actually be selected.
fn create_analysts(config: &AppConfig) -> WiringResult<Vec<(Arc<dyn AnalystPort>, u32)>> {
    let mut analysts: Vec<(Arc<dyn AnalystPort>, u32)> = vec![(
        Arc::new(MockAnalyst::new(StdRng::from_entropy())),
        config.mock_weight.unwrap_or_default(),
    )];

    let ai_weight = config.ai_weight.unwrap_or_default();
    if ai_weight > 0 {
        let vision = VisionAnalyst::new(
            VisionAnalystConfig {
                base_url: config.ai_base_url.clone(),
                model: config.ai_model.clone(),
                api_key: config.ai_api_key.clone(),
                timeout: Duration::from_secs(config.ai_timeout_secs.unwrap_or_default()),
            },
            StdRng::from_entropy(),
        )
        .map_err(|e| WiringError::AnalystInit(format!("{:#}", e)))?;
        analysts.push((Arc::new(vision), ai_weight));
    }

    Ok(analysts)
}

fn create_share_secret(configured: &str) -> ShareSecret {
    if configured.is_empty() {
        warn!("no share secret configured; generated a random one, share links will not survive a restart");
        ShareSecret::generate(&mut OsRng)
    } else {
        ShareSecret::from_passphrase(configured)
    }
}

/// Wire all dependencies together
/// 将所有依赖连接在一起
///
/// `config` must already be resolved (defaults applied and validated).
pub fn wire_dependencies(config: &AppConfig) -> WiringResult<AppDeps> {
    // Step 1: System services / 系统服务
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

    // Step 2: Persistence / 持久化
    let db_pool = create_db_pool(&config.database_path)?;
    let analysis_repo: Arc<dyn AnalysisRepositoryPort> = Arc::new(DieselAnalysisRepository::new(
        DieselSqliteExecutor::new(db_pool),
        clock.clone(),
    ));

    // Step 3: Object storage / 对象存储
    let object_storage = create_object_storage(&config.storage_root, clock.clone())?;

    // Step 4: Analysts / 分析器
    let analysts = AnalystRegistry::new(create_analysts(config)?, StdRng::from_entropy())
        .map_err(|e| WiringError::AnalystInit(e.to_string()))?;

    // Step 5: Sharing / 分享
    let share_codec = ShareTokenCodec::new(create_share_secret(&config.share_secret), clock.clone());

    info!(
        database = %config.database_path.display(),
        storage_root = %config.storage_root.display(),
        analysts = analysts.len(),
        "dependencies wired"
    );

    Ok(AppDeps {
        analysis_repo,
        object_storage,
        api_route: ApiRoute {
            host: config.api_host.clone(),
            prefix: config.api_prefix.clone(),
            version: config.api_version.clone(),
        },
        analysts: Arc::new(analysts),
        percentile_rng: Box::new(StdRng::from_entropy()),
        share_codec: Arc::new(share_codec),
        clock,
    })
}
