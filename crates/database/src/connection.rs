use crate::{DatabaseError, DatabaseResult};
use shared_lib::AppConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 数据库连接池
pub type DatabasePool = Pool<Postgres>;

/// 创建数据库连接池并执行迁移
pub async fn initialize_database(config: Arc<AppConfig>) -> DatabaseResult<DatabasePool> {
    // pool 内部已经是引用计数，直接 clone 即可跨任务使用
    let pool = PgPoolOptions::new()
        // 展示站点流量很小，预留少量连接即可
        .min_connections(2)
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(3))
        // 1小时空闲则释放
        .idle_timeout(Duration::from_secs(3600))
        // 6小时强制释放
        .max_lifetime(Duration::from_secs(3600 * 6))
        .test_before_acquire(true)
        .connect(&config.postgresql_conn_str)
        .await
        .map_err(|e| DatabaseError::connection(format!("连接PostgreSQL数据库失败: {e}")))?;

    info!("🗄️ 数据库连接池创建成功");

    info!("🔄 开始执行数据库迁移...");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::migration(format!("数据库迁移失败: {e}")))?;

    info!("✅ 数据库迁移完成");

    Ok(pool)
}
