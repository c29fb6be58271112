//! 运行包嵌入页面
//!
//! `/view/{id}` 返回一个只包含沙箱 iframe 的 HTML 页面，运行包通过 `/runner/{id}/` 加载，
//! 外部链接直接嵌入。`?variant=thumbnail` 用于列表缩略图，不计入浏览次数。

use crate::models::collections::runner_url;
use crate::models::err::AppError;
use crate::models::sandbox::SandboxPolicyInfo;
use crate::sandbox::{render_page, RUNNER, THUMBNAIL};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use database::CollectionKind;
use serde::Deserialize;
use tracing::{debug, warn};

/// 嵌入方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewVariant {
    #[default]
    Full,
    Thumbnail,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub variant: ViewVariant,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/view/{id}", get(view_collection))
}

async fn view_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, AppError> {
    debug!("🖼️ 渲染作品集 {} ({:?})", id, query.variant);

    let collection = state.collections.get_collection_by_id(&id).await?;

    let src = match collection.kind {
        CollectionKind::Run if collection.storage_id.is_some() => runner_url(&collection.id),
        CollectionKind::Link => collection.link.clone().ok_or(AppError::NotFound)?,
        CollectionKind::Run => return Err(AppError::NotFound),
    };

    let policy = match query.variant {
        ViewVariant::Full => {
            if let Err(err) = state.collections.increment_views(&collection.id).await {
                warn!("作品集 {} 浏览计数失败: {err}", collection.id);
            }
            RUNNER
        }
        ViewVariant::Thumbnail => THUMBNAIL,
    };

    Ok(Html(render_page(&policy, &src, &collection.name)))
}

/// 运行包沙箱策略
///
/// 前端自行渲染 iframe 时使用的 `sandbox` 属性值。
#[utoipa::path(get,
    path = "/sandbox-policy",
    tag = "sandbox",
    responses(
        (status = 200, description = "Sandbox attributes", body = SandboxPolicyInfo)
    )
)]
pub async fn sandbox_policy() -> Json<SandboxPolicyInfo> {
    Json(SandboxPolicyInfo {
        runner: RUNNER.attribute(),
        thumbnail: THUMBNAIL.attribute(),
    })
}
