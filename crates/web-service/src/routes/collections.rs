//! 作品集相关接口
//!

use crate::auth::AdminSession;
use crate::models::collections::{
    check_kind_refs, parse_kind, CollectionCreate, CollectionInfo, CollectionUpdate, ViewCount,
};
use crate::models::common::{ErrorReply, Reply, ReplyList};
use crate::models::err::AppError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use bundle_storage::generate_id;
use tracing::{debug, info, warn};
use validator::Validate;

/// 查询全部作品集
///
/// 按创建时间倒序返回。每次调用都会累加一次全局访问计数，计数失败只记录日志，不影响返回。
#[utoipa::path(get,
    path = "/collections",
    tag = "collections",
    responses(
        (status = 200, description = "Collection list", body = ReplyList<CollectionInfo>)
    ),
)]
pub async fn list_collections(State(state): State<AppState>) -> Result<Json<ReplyList<CollectionInfo>>, AppError> {
    debug!("🔍 查询作品集列表");

    if let Err(err) = state.stats.increment_global_hits().await {
        warn!("全局访问计数失败: {err}");
    }

    let collections = state.collections.list_collections().await?;

    Ok(Json(ReplyList {
        total: collections.len() as u32,
        data: collections.into_iter().map(Into::into).collect(),
    }))
}

/// 创建作品集
///
/// `link` 类型必须提供合法的 `link`，`run` 类型必须提供上传接口返回的 `storage_id`。
#[utoipa::path(post,
    path = "/collections",
    tag = "collections",
    request_body = CollectionCreate,
    responses(
        (status = 200, description = "Create collection result", body = Reply<CollectionInfo>),
        (status = 400, description = "Invalid collection", body = ErrorReply),
        (status = 401, description = "Admin session required", body = ErrorReply)
    )
)]
pub async fn create_collection(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(collection): Json<CollectionCreate>,
) -> Result<Json<Reply<CollectionInfo>>, AppError> {
    debug!("📝 创建作品集 {:#?}", collection);

    collection.validate()?;
    let kind = parse_kind(&collection.kind)?;
    check_kind_refs(kind, collection.link.as_deref(), collection.storage_id.as_deref())?;

    let db_collection = database::CollectionCreate {
        id: generate_id(),
        kind,
        name: collection.name,
        description: collection.description,
        tags: collection.tags,
        link: collection.link,
        thumbnail: collection.thumbnail,
        storage_id: collection.storage_id,
    };
    let created = state.collections.create_collection(db_collection).await?;

    info!("✅ 作品集已创建: {} ({}), 会话登录于 {}", created.id, created.kind, admin.login_at);
    Ok(Json(Reply { data: created.into() }))
}

/// 查询指定作品集
#[utoipa::path(get,
    path = "/collections/{id}",
    tag = "collections",
    params(("id" = String, Path, description = "作品集ID")),
    responses(
        (status = 200, description = "Collection", body = Reply<CollectionInfo>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Reply<CollectionInfo>>, AppError> {
    debug!("Getting collection id {:#?}", id);

    let collection = state.collections.get_collection_by_id(&id).await?;

    Ok(Json(Reply { data: collection.into() }))
}

/// 更新作品集
///
/// 只更新请求中提供的字段，合并之后的记录仍然需要满足类型与引用字段的约束。
#[utoipa::path(patch,
    path = "/collections/{id}",
    tag = "collections",
    params(("id" = String, Path, description = "作品集ID")),
    request_body = CollectionUpdate,
    responses(
        (status = 200, description = "Updated collection", body = Reply<CollectionInfo>),
        (status = 400, description = "Invalid collection", body = ErrorReply),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_collection(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CollectionUpdate>,
) -> Result<Json<Reply<CollectionInfo>>, AppError> {
    debug!("Updating collection {} with {:#?}", id, update);

    update.validate()?;
    let kind = update.kind.as_deref().map(parse_kind).transpose()?;

    let current = state.collections.get_collection_by_id(&id).await?;
    check_kind_refs(
        kind.unwrap_or(current.kind),
        update.link.as_deref().or(current.link.as_deref()),
        update.storage_id.as_deref().or(current.storage_id.as_deref()),
    )?;

    let db_update = database::CollectionUpdate {
        kind,
        name: update.name,
        description: update.description,
        tags: update.tags,
        link: update.link,
        thumbnail: update.thumbnail,
        storage_id: update.storage_id,
    };
    let updated = state.collections.update_collection(&id, db_update).await?;

    info!("✏️ 作品集已更新: {}, 会话登录于 {}", updated.id, admin.login_at);

    Ok(Json(Reply { data: updated.into() }))
}

/// 删除指定的作品集
///
/// 只删除数据库记录，运行包目录不会被清理。
#[utoipa::path(delete,
    path = "/collections/{id}",
    tag = "collections",
    params(("id" = String, Path, description = "作品集ID")),
    responses(
        (status = 200, description = "Deleted collection", body = Reply<CollectionInfo>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_collection(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Reply<CollectionInfo>>, AppError> {
    debug!("delete collection {:#?}", id);

    let deleted = state.collections.delete_collection(&id).await?;
    info!("🗑️ 作品集已删除: {}, 会话登录于 {}", deleted.id, admin.login_at);

    if let Some(storage_id) = &deleted.storage_id {
        // TODO: 没有其他作品集引用时清理运行包目录
        warn!("🗂️ 作品集 {} 已删除，运行包 {} 仍保留在磁盘上", deleted.id, storage_id);
    }

    Ok(Json(Reply { data: deleted.into() }))
}

/// 记录一次浏览
///
/// 作品集浏览次数和全局访问计数各加一。
#[utoipa::path(post,
    path = "/collections/{id}/view",
    tag = "collections",
    params(("id" = String, Path, description = "作品集ID")),
    responses(
        (status = 200, description = "View count after increment", body = Reply<ViewCount>),
        (status = 404, description = "Not found")
    )
)]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Reply<ViewCount>>, AppError> {
    let views = state.collections.increment_views(&id).await?;

    if let Err(err) = state.stats.increment_global_hits().await {
        warn!("全局访问计数失败: {err}");
    }

    Ok(Json(Reply { data: ViewCount { views } }))
}
