use crate::models::common::ErrorReply;
use axum::extract::multipart::MultipartError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bundle_storage::StorageError;
use color_eyre::eyre::Error;
use database::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

/// 使用 [`thiserror`] 定义错误类型
/// 方便根据类型转换为相应的http错误码
///
/// 返回给客户端的内容只包含错误码，不包含文件系统路径和数据库细节，细节只写入日志。
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据验证错误，这种错误通常都是用户参数不正确导致的
    #[error(transparent)]
    ValidationFailed(#[from] ValidationErrors),

    /// 请求不合法，携带返回给客户端的错误码
    #[error("请求不合法: {0}")]
    BadRequest(&'static str),

    /// multipart 请求体解析失败
    #[error(transparent)]
    MultipartError(#[from] MultipartError),

    /// 缺少或无效的管理员会话
    #[error("未登录")]
    Unauthorized,

    /// 管理员密钥错误
    #[error("管理员密钥错误，第 {attempts} 次")]
    WrongKey { attempts: i32 },

    /// 登录失败次数过多，剩余锁定秒数
    #[error("登录已锁定，剩余 {remaining} 秒")]
    Locked { remaining: i64 },

    /// 资源不存在
    #[error("资源不存在")]
    NotFound,

    /// 运行包存储错误
    #[error(transparent)]
    StorageError(#[from] StorageError),

    /// 仓库层数据库错误
    #[error(transparent)]
    RepositoryError(#[from] DatabaseError),

    /// 其他类型错误
    #[error(transparent)]
    InternalError(#[from] Error),
}

fn error_code(status: StatusCode, code: &str) -> Response {
    (status, Json(ErrorReply { error: code.to_string() })).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

/// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ValidationFailed(err) => {
                warn!("参数校验失败: {err}");
                error_code(StatusCode::BAD_REQUEST, "invalid-request")
            }
            AppError::BadRequest(code) => error_code(StatusCode::BAD_REQUEST, code),
            AppError::MultipartError(err) => {
                warn!("multipart 解析失败: {err}");
                error_code(err.status(), "invalid-request")
            }
            AppError::Unauthorized => error_code(StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::WrongKey { attempts } => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "ok": false, "error": "wrong-key", "attempts": attempts })),
            )
                .into_response(),
            AppError::Locked { remaining } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "ok": false, "error": "locked", "remaining": remaining })),
            )
                .into_response(),
            AppError::NotFound => not_found(),
            AppError::StorageError(err) => match err {
                StorageError::EmptyUpload => error_code(StatusCode::BAD_REQUEST, "no-files"),
                StorageError::PathEscape(_) => error_code(StatusCode::BAD_REQUEST, "path-escape"),
                StorageError::InvalidEntry(_) => error_code(StatusCode::BAD_REQUEST, "invalid-entry"),
                StorageError::InvalidArchive(err) => {
                    warn!("无效的压缩包: {err}");
                    error_code(StatusCode::BAD_REQUEST, "invalid-archive")
                }
                StorageError::BundleTooLarge(limit) => {
                    warn!("运行包超过 {limit} 字节上限");
                    error_code(StatusCode::BAD_REQUEST, "bundle-too-large")
                }
                StorageError::TooManyEntries(limit) => {
                    warn!("运行包条目超过 {limit} 个");
                    error_code(StatusCode::BAD_REQUEST, "too-many-entries")
                }
                StorageError::InvalidStorageId | StorageError::NotFound => not_found(),
                StorageError::Forbidden => forbidden(),
                StorageError::Io(err) => {
                    error!("❌ 运行包存储IO错误: {err:?}");
                    error_code(StatusCode::INTERNAL_SERVER_ERROR, "storage-failure")
                }
            },
            AppError::RepositoryError(err) => match err {
                DatabaseError::NotFound(_) => not_found(),
                DatabaseError::ValidationError(msg) => {
                    warn!("数据校验错误: {msg}");
                    error_code(StatusCode::BAD_REQUEST, "invalid-request")
                }
                _ => {
                    error!("❌ 数据库错误: {err}");
                    error_code(StatusCode::INTERNAL_SERVER_ERROR, "database-failure")
                }
            },
            AppError::InternalError(err) => {
                error!("❌ 内部错误: {err:?}");
                error_code(StatusCode::INTERNAL_SERVER_ERROR, "internal-error")
            }
        }
    }
}
