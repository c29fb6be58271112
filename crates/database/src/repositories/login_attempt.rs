//! 登录失败计数仓库

use crate::models::login_attempt::LoginAttempt;
use crate::repositories::traits::LoginAttemptRepositoryTrait;
use crate::DatabaseResult;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LoginAttemptRepository {
    pool: PgPool,
}

impl LoginAttemptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LoginAttemptRepositoryTrait for LoginAttemptRepository {
    async fn get_attempt(&self, ip: &str) -> DatabaseResult<Option<LoginAttempt>> {
        let attempt = sqlx::query_as::<_, LoginAttempt>(
            "SELECT ip, failed_attempts, locked_until, updated_at FROM auth_attempts WHERE ip = $1",
        )
        .bind(ip)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    /// 记录一次失败
    ///
    /// 同一地址的并发失败通过 `ON CONFLICT DO UPDATE` 在一条语句内完成累加，不会丢失计数。
    /// 锁定过期后计数不会清零，下一次失败会立即重新锁定。
    async fn record_failure(&self, ip: &str, max_attempts: i32, lock_until: DateTime<Utc>) -> DatabaseResult<LoginAttempt> {
        let attempt = sqlx::query_as::<_, LoginAttempt>(
            r#"
            INSERT INTO auth_attempts (ip, failed_attempts, locked_until, updated_at)
            VALUES ($1, 1, CASE WHEN 1 >= $2::INTEGER THEN $3::TIMESTAMPTZ END, now())
            ON CONFLICT (ip) DO UPDATE
            SET failed_attempts = auth_attempts.failed_attempts + 1,
                locked_until = CASE
                    WHEN auth_attempts.failed_attempts + 1 >= $2::INTEGER THEN $3::TIMESTAMPTZ
                    ELSE auth_attempts.locked_until
                END,
                updated_at = now()
            RETURNING ip, failed_attempts, locked_until, updated_at
            "#,
        )
        .bind(ip)
        .bind(max_attempts)
        .bind(lock_until)
        .fetch_one(&self.pool)
        .await?;

        debug!("⚠️ 登录失败 {} 第 {} 次", ip, attempt.failed_attempts);
        Ok(attempt)
    }

    async fn reset_attempts(&self, ip: &str) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM auth_attempts WHERE ip = $1")
            .bind(ip)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
