//! 运行包上传接口

use crate::auth::AdminSession;
use crate::models::common::{ErrorReply, Reply};
use crate::models::err::AppError;
use crate::models::upload::UploadInfo;
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use bundle_storage::{IngestMode, UploadedFile};
use tracing::{debug, info};

/// 上传文件所在的 multipart 字段
const FILE_FIELD: &str = "file";

/// 上传运行包
///
/// `file` 字段可以重复出现：
/// - 只有一个 `.zip` 文件时解压到运行包目录
/// - 其他情况逐个写入，文件名中的相对目录会被保留
///
/// 任意条目越出运行包目录时整批上传失败。
#[utoipa::path(post,
    path = "/upload/run",
    tag = "upload",
    request_body(content = String, content_type = "multipart/form-data", description = "字段 `file`，可重复"),
    responses(
        (status = 200, description = "Bundle stored", body = Reply<UploadInfo>),
        (status = 400, description = "no-files / path-escape / invalid-entry / invalid-archive / bundle-too-large / too-many-entries", body = ErrorReply),
        (status = 401, description = "Admin session required", body = ErrorReply),
        (status = 500, description = "Storage failure", body = ErrorReply)
    )
)]
pub async fn upload_run(
    admin: AdminSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Reply<UploadInfo>>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await?;

        debug!("📥 接收文件 {} ({} bytes)", name, content.len());
        files.push(UploadedFile::new(name, content.to_vec()));
    }

    let storage_id = state.bundles.ingest(IngestMode::from_uploads(files)?).await?;

    info!("✅ 运行包上传完成: {}, 会话登录于 {}", storage_id, admin.login_at);
    Ok(Json(Reply {
        data: UploadInfo {
            storage_id: storage_id.into_inner(),
        },
    }))
}
