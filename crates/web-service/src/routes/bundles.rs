//! 运行包静态文件服务
//!
//! | 路由 | 查找方式 | 目录回退 `index.html` | 缓存 |
//! |---|---|---|---|
//! | `/api/v1/preview/{storage_id}/...` | 直接按存储标识 | 否 | 无 |
//! | `/runner/{id}/...` | 作品集（必须是 `run` 类型）→ 存储标识 | 是 | 一年，immutable |
//!
//! 两者都经过同一套路径越界检查，越界返回 403，文件不存在返回 404。
//! 这些路由返回任意文件内容，不进入 OpenAPI 文档。

use crate::models::err::AppError;
use crate::sandbox::RUNNER_CSP;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_SECURITY_POLICY, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bundle_storage::{IndexFallback, ResolvedFile};
use database::CollectionKind;
use tracing::debug;

/// 运行包内容不可变，允许长期缓存
const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/preview/{storage_id}", get(preview_root))
        .route("/api/v1/preview/{storage_id}/", get(preview_root))
        .route("/api/v1/preview/{storage_id}/{*path}", get(preview_file))
        .route("/runner/{id}", get(runner_root))
        .route("/runner/{id}/", get(runner_root))
        .route("/runner/{id}/{*path}", get(runner_file))
}

async fn preview_root(State(state): State<AppState>, Path(storage_id): Path<String>) -> Result<Response, AppError> {
    preview(&state, &storage_id, None).await
}

async fn preview_file(
    State(state): State<AppState>,
    Path((storage_id, path)): Path<(String, String)>,
) -> Result<Response, AppError> {
    preview(&state, &storage_id, Some(&path)).await
}

async fn runner_root(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, AppError> {
    runner(&state, &id, None).await
}

async fn runner_file(
    State(state): State<AppState>,
    Path((id, path)): Path<(String, String)>,
) -> Result<Response, AppError> {
    runner(&state, &id, Some(&path)).await
}

/// 按存储标识预览，用于作品集创建之前检查上传结果
async fn preview(state: &AppState, storage_id: &str, path: Option<&str>) -> Result<Response, AppError> {
    debug!("👀 预览运行包 {} {:?}", storage_id, path);

    let file = state.bundles.resolve(storage_id, path, IndexFallback::Disabled).await?;
    Ok(bundle_response(file, None))
}

/// 按作品集运行
async fn runner(state: &AppState, id: &str, path: Option<&str>) -> Result<Response, AppError> {
    let collection = state.collections.get_collection_by_id(id).await?;

    let storage_id = match (collection.kind, collection.storage_id) {
        (CollectionKind::Run, Some(storage_id)) => storage_id,
        _ => return Err(AppError::NotFound),
    };

    let file = state.bundles.resolve(&storage_id, path, IndexFallback::Enabled).await?;
    Ok(bundle_response(file, Some(IMMUTABLE_CACHE)))
}

/// 运行包文件响应
///
/// 除了 `Content-Type` 之外，统一加上 `nosniff` 和沙箱 CSP。
fn bundle_response(file: ResolvedFile, cache_control: Option<&'static str>) -> Response {
    let mut response = file.content.into_response();
    let headers = response.headers_mut();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static(file.content_type));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(RUNNER_CSP));
    if let Some(cache_control) = cache_control {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache_control));
    }

    response
}
