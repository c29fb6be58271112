//! 访问统计仓库

use crate::models::stats::{AdminStats, TOTAL_HITS_KEY};
use crate::repositories::traits::StatsRepositoryTrait;
use crate::DatabaseResult;
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl StatsRepositoryTrait for StatsRepository {
    async fn increment_global_hits(&self) -> DatabaseResult<i64> {
        let hits: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO global_stats (id, value, updated_at)
            VALUES ($1, 1, now())
            ON CONFLICT (id) DO UPDATE
            SET value = global_stats.value + 1,
                updated_at = now()
            RETURNING value
            "#,
        )
        .bind(TOTAL_HITS_KEY)
        .fetch_one(&self.pool)
        .await?;

        Ok(hits)
    }

    async fn get_admin_stats(&self) -> DatabaseResult<AdminStats> {
        let stats = sqlx::query_as::<_, AdminStats>(
            r#"
            SELECT coalesce((SELECT value FROM global_stats WHERE id = $1), 0)::BIGINT AS total_hits,
                   coalesce((SELECT sum(views) FROM collections), 0)::BIGINT          AS total_views,
                   (SELECT count(*) FROM collections)::BIGINT                         AS project_count
            "#,
        )
        .bind(TOTAL_HITS_KEY)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
