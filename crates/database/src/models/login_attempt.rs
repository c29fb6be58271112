//! 登录失败计数模型

use chrono::{DateTime, Utc};

/// 某个客户端地址的登录失败记录
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoginAttempt {
    pub ip: String,
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl LoginAttempt {
    /// 距离解锁的剩余秒数，未锁定或已过期时返回 `None`
    pub fn remaining_lock(&self, now: DateTime<Utc>) -> Option<i64> {
        let locked_until = self.locked_until?;
        let remaining = (locked_until - now).num_seconds();
        (locked_until > now).then_some(remaining.max(1))
    }
}
