//! 管理员登录与统计接口
//!
//! 登录失败按客户端地址计数，连续失败达到上限后锁定一段时间。
//! 计数只在登录成功时清零，锁定过期之后再失败一次会立即重新锁定。

use crate::auth::{client_ip, expired_session_cookie, issue_token, session_cookie, AdminSession};
use crate::models::admin::{AdminStatsInfo, LoginReply, LoginRequest, LogoutReply};
use crate::models::common::{ErrorReply, Reply};
use crate::models::err::AppError;
use crate::AppState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{TimeDelta, Utc};
use color_eyre::eyre::eyre;
use tracing::{debug, info, warn};

/// 管理员登录
///
/// 密钥正确时签发会话令牌，同时写入 `HttpOnly` Cookie。
#[utoipa::path(post,
    path = "/admin/login",
    tag = "admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginReply),
        (status = 401, description = "Wrong key, body carries the failed attempt count"),
        (status = 429, description = "Locked, body carries the remaining seconds")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let ip = client_ip(&headers);
    let auth = &state.config.auth;
    let now = Utc::now();

    debug!("🔑 管理员登录请求 {}", ip);

    if let Some(remaining) = state
        .login_attempts
        .get_attempt(&ip)
        .await?
        .and_then(|attempt| attempt.remaining_lock(now))
    {
        return Err(AppError::Locked { remaining });
    }

    if auth.admin_keys.iter().any(|key| key == &request.key) {
        state.login_attempts.reset_attempts(&ip).await?;

        let (token, expires_at) = issue_token(auth, now).map_err(|e| eyre!("签发会话令牌失败: {e}"))?;
        let cookie = session_cookie(&token, auth.session_ttl.as_secs());

        info!("✅ 管理员登录成功 {}", ip);
        return Ok((
            [(SET_COOKIE, cookie)],
            Json(LoginReply {
                ok: true,
                token,
                expires_at,
            }),
        )
            .into_response());
    }

    let lock_secs = auth.lock_duration.as_secs() as i64;
    let lock_until = now + TimeDelta::seconds(lock_secs);
    let attempt = state
        .login_attempts
        .record_failure(&ip, auth.max_failed_attempts, lock_until)
        .await?;

    if attempt.failed_attempts >= auth.max_failed_attempts {
        warn!("🔒 {} 登录失败 {} 次，锁定 {} 秒", ip, attempt.failed_attempts, lock_secs);
        return Err(AppError::Locked { remaining: lock_secs });
    }

    warn!("管理员密钥错误 {} 第 {} 次", ip, attempt.failed_attempts);
    Err(AppError::WrongKey {
        attempts: attempt.failed_attempts,
    })
}

/// 退出登录，清除会话 Cookie
#[utoipa::path(post,
    path = "/admin/logout",
    tag = "admin",
    responses(
        (status = 200, description = "Logged out", body = LogoutReply)
    )
)]
pub async fn logout() -> impl IntoResponse {
    ([(SET_COOKIE, expired_session_cookie())], Json(LogoutReply { ok: true }))
}

/// 管理后台统计
#[utoipa::path(get,
    path = "/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Stats", body = Reply<AdminStatsInfo>),
        (status = 401, description = "Admin session required", body = ErrorReply)
    )
)]
pub async fn admin_stats(_admin: AdminSession, State(state): State<AppState>) -> Result<Json<Reply<AdminStatsInfo>>, AppError> {
    let stats = state.stats.get_admin_stats().await?;

    Ok(Json(Reply { data: stats.into() }))
}
