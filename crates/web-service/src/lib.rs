//! Web服务模块
//!
//! 提供 HTTP API 接口、运行包静态文件服务、沙箱嵌入页面和文档服务

use bundle_storage::{BundleStore, IngestLimits};
use color_eyre::Result;
use database::{
    CollectionRepository, CollectionRepositoryTrait, DatabasePool, LoginAttemptRepository,
    LoginAttemptRepositoryTrait, StatsRepository, StatsRepositoryTrait,
};
use shared_lib::AppConfig;
use std::sync::Arc;
use tokio::sync::watch::Receiver;
use tracing::{info, warn};

pub mod auth;
pub mod models;
pub mod routes;
pub mod sandbox;

/// 应用共享状态
///
/// 仓库以 trait object 的形式注入，HTTP 测试可以替换为内存实现。
#[derive(Clone)]
pub struct AppState {
    pub collections: Arc<dyn CollectionRepositoryTrait>,
    pub login_attempts: Arc<dyn LoginAttemptRepositoryTrait>,
    pub stats: Arc<dyn StatsRepositoryTrait>,
    pub bundles: Arc<BundleStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// 使用 Postgres 仓库构建共享状态
    pub fn from_pool(config: Arc<AppConfig>, pool: DatabasePool) -> Result<Self> {
        Ok(Self {
            collections: Arc::new(CollectionRepository::new(pool.clone())),
            login_attempts: Arc::new(LoginAttemptRepository::new(pool.clone())),
            stats: Arc::new(StatsRepository::new(pool)),
            bundles: Arc::new(
                BundleStore::new(&config.storage_root)?.with_limits(IngestLimits::new(config.max_bundle_bytes)),
            ),
            config,
        })
    }
}

/// 启动 Web 服务
pub async fn start_web_service(config: Arc<AppConfig>, pool: DatabasePool, mut shutdown_rx: Receiver<bool>) -> Result<()> {
    let shared_state = AppState::from_pool(config.clone(), pool)?;
    info!("📁 运行包存储目录: {}", config.storage_root.display());

    let router = routes::create_app_router(shared_state);

    info!("🚀 启动 Web Service 在 {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            if shutdown_rx.changed().await.is_err() {
                warn!("关闭信号发送端已释放");
            }
            info!("🛑 Web Service 正在关闭...");
        })
        .await?;

    Ok(())
}
