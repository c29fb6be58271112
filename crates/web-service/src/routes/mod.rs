//! 路由入口
//!
//! 提供 [`create_app_router`] 函数，导出当前App的所有路由。
//!
//! JSON 接口通过 [`OpenApiRouter`] 注册并生成文档，运行包文件服务和嵌入页面返回任意内容，
//! 使用原生 [`Router`] 注册，不进入文档。

use crate::routes::admin::{__path_admin_stats, __path_login, __path_logout, admin_stats, login, logout};
use crate::routes::collections::{
    __path_create_collection, __path_delete_collection, __path_get_collection, __path_list_collections,
    __path_record_view, __path_update_collection, create_collection, delete_collection, get_collection,
    list_collections, record_view, update_collection,
};
use crate::routes::upload::{__path_upload_run, upload_run};
use crate::routes::views::{__path_sandbox_policy, sandbox_policy};
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_scalar::{Scalar, Servable};

pub mod admin;
pub mod bundles;
pub mod collections;
pub mod upload;
pub mod views;

/// 导出当前App的所有 JSON 接口
///
/// ## **❗️注意事项：**
///
/// 由于 [`routes!`] 宏限制，在同一个宏里面不能同时定义多个相同类型的http接口，
/// 例如 `login` 和 `logout` 都是 `post`，需要拆开定义：
///
/// ```rust,ignore
/// .routes(routes!(login))
/// .routes(routes!(logout))
/// ```
fn routers() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_collections, create_collection))
        .routes(routes!(get_collection, update_collection, delete_collection))
        .routes(routes!(record_view))
        .routes(routes!(login))
        .routes(routes!(logout))
        .routes(routes!(admin_stats))
        .routes(routes!(upload_run))
        .routes(routes!(sandbox_policy))
}

/// 创建当前App的路由
///
/// 完成以下功能：
/// - 生成OpenAPI文档，通过 `/docs` 访问
/// - 注册 JSON 接口、运行包文件服务和嵌入页面
/// - 按配置限制上传请求体大小
/// - 记录每个请求的 tracing span
pub fn create_app_router(shared_state: AppState) -> Router {
    // 当前项目的OpenAPI声明
    #[derive(OpenApi)]
    #[openapi(
        tags(
            (name = "showcase", description = r#"
作品集展示站点：

- 作品集管理
- 静态站点（运行包）上传与沙箱预览
- 管理员登录
            "#)
        ),
    )]
    struct ApiDoc;

    let body_limit = shared_state.config.max_upload_bytes;

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/v1", routers())
        .split_for_parts();

    router
        .merge(bundles::router())
        .merge(views::router())
        .with_state(shared_state)
        // 合并文档路由，用户可通过 /docs 访问文档网页地址
        .merge(Scalar::with_url("/docs", api))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
