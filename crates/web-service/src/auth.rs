//! 管理员会话
//!
//! 登录成功后签发 HS256 令牌，令牌既在返回体中给出，也通过 `HttpOnly` Cookie 下发。
//! 需要管理员权限的接口在参数中加上 [`AdminSession`] 提取器即可。

use crate::models::err::AppError;
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared_lib::AuthConfig;
use tracing::debug;

/// 会话 Cookie 名称
pub const SESSION_COOKIE: &str = "admin_session";

/// 管理员角色
pub const ADMIN_ROLE: &str = "admin";

/// 无法获取客户端地址时使用的键
const UNKNOWN_CLIENT: &str = "unknown";

/// 会话令牌内容
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub role: String,
    /// 登录时间（Unix 秒）
    pub login_at: i64,
    pub iat: i64,
    pub exp: i64,
}

/// 签发管理员会话令牌，返回令牌和过期时间
pub fn issue_token(auth: &AuthConfig, now: DateTime<Utc>) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let iat = now.timestamp();
    let ttl = i64::try_from(auth.session_ttl.as_secs()).unwrap_or(i64::MAX);
    let exp = iat.saturating_add(ttl);

    let claims = Claims {
        role: ADMIN_ROLE.to_string(),
        login_at: iat,
        iat,
        exp,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.jwt_secret.as_bytes()))?;
    Ok((token, exp))
}

/// 校验令牌签名和过期时间
pub fn verify_token(token: &str, auth: &AuthConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// 会话 Cookie
pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age_secs}")
}

/// 清除会话的 Cookie
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0")
}

/// 客户端地址
///
/// 取 `x-forwarded-for` 的第一个地址，没有时统一记为 `unknown`。
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// 从 `Authorization: Bearer` 或会话 Cookie 中读取令牌
fn session_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
}

/// 已登录的管理员
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// 登录时间（Unix 秒），写操作日志里带上它以便区分会话
    pub login_at: i64,
}

impl AdminSession {
    /// 校验请求头中的会话令牌
    pub fn from_headers(headers: &HeaderMap, auth: &AuthConfig) -> Result<Self, AppError> {
        let token = session_token(headers).ok_or(AppError::Unauthorized)?;

        let claims = verify_token(token, auth).map_err(|err| {
            debug!("会话令牌无效: {err}");
            AppError::Unauthorized
        })?;

        if claims.role != ADMIN_ROLE {
            return Err(AppError::Unauthorized);
        }

        Ok(AdminSession {
            login_at: claims.login_at,
        })
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers, &state.config.auth)
    }
}
