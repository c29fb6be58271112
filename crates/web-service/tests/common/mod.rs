//! HTTP 测试公共工具
//!
//! 使用内存仓库替换 Postgres，运行包写入临时目录，通过 `oneshot` 直接驱动完整路由。

#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use bundle_storage::{BundleStore, IngestLimits};
use chrono::{DateTime, Utc};
use database::{
    AdminStats, CollectionCreate, CollectionInfo, CollectionRepositoryTrait, CollectionUpdate, DatabaseError,
    DatabaseResult, LoginAttempt, LoginAttemptRepositoryTrait, StatsRepositoryTrait,
};
use http_body_util::BodyExt;
use shared_lib::{AppConfig, AuthConfig};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use web_service::auth::issue_token;
use web_service::routes::create_app_router;
use web_service::AppState;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ADMIN_KEY: &str = "letmein";
pub const MAX_ATTEMPTS: i32 = 3;
pub const LOCK_SECONDS: u64 = 300;
pub const MAX_BUNDLE_BYTES: u64 = 256 * 1024;
const BOUNDARY: &str = "showcase-test-boundary";

// ---------------------------------------------------------------------------
// 内存仓库
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryCollections {
    rows: Mutex<Vec<CollectionInfo>>,
}

impl MemoryCollections {
    pub fn views(&self, id: &str) -> Option<i64> {
        self.rows.lock().unwrap().iter().find(|c| c.id == id).map(|c| c.views)
    }

    fn missing(id: &str) -> DatabaseError {
        DatabaseError::not_found(format!("collection {id}"))
    }
}

#[async_trait::async_trait]
impl CollectionRepositoryTrait for MemoryCollections {
    async fn list_collections(&self) -> DatabaseResult<Vec<CollectionInfo>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn create_collection(&self, c: CollectionCreate) -> DatabaseResult<CollectionInfo> {
        let now = Utc::now();
        let info = CollectionInfo {
            id: c.id,
            kind: c.kind,
            name: c.name,
            description: c.description,
            tags: c.tags,
            link: c.link,
            thumbnail: c.thumbnail,
            storage_id: c.storage_id,
            views: 0,
            created_at: now,
            updated_at: now,
        };
        // 最新创建的排在前面
        self.rows.lock().unwrap().insert(0, info.clone());
        Ok(info)
    }

    async fn get_collection_by_id(&self, id: &str) -> DatabaseResult<CollectionInfo> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Self::missing(id))
    }

    async fn update_collection(&self, id: &str, u: CollectionUpdate) -> DatabaseResult<CollectionInfo> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|c| c.id == id).ok_or_else(|| Self::missing(id))?;

        if let Some(kind) = u.kind {
            row.kind = kind;
        }
        if let Some(name) = u.name {
            row.name = name;
        }
        if let Some(description) = u.description {
            row.description = description;
        }
        row.tags = u.tags.or(row.tags.take());
        row.link = u.link.or(row.link.take());
        row.thumbnail = u.thumbnail.or(row.thumbnail.take());
        row.storage_id = u.storage_id.or(row.storage_id.take());
        row.updated_at = Utc::now();

        Ok(row.clone())
    }

    async fn delete_collection(&self, id: &str) -> DatabaseResult<CollectionInfo> {
        let mut rows = self.rows.lock().unwrap();
        let index = rows.iter().position(|c| c.id == id).ok_or_else(|| Self::missing(id))?;
        Ok(rows.remove(index))
    }

    async fn increment_views(&self, id: &str) -> DatabaseResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|c| c.id == id).ok_or_else(|| Self::missing(id))?;
        row.views += 1;
        Ok(row.views)
    }
}

#[derive(Default)]
pub struct MemoryLoginAttempts {
    attempts: Mutex<HashMap<String, LoginAttempt>>,
}

impl MemoryLoginAttempts {
    /// 把锁定截止时间改到过去，模拟锁定过期
    pub fn expire_lock(&self, ip: &str) {
        if let Some(attempt) = self.attempts.lock().unwrap().get_mut(ip) {
            attempt.locked_until = Some(Utc::now() - chrono::Duration::seconds(1));
        }
    }

    pub fn failed_attempts(&self, ip: &str) -> i32 {
        self.attempts.lock().unwrap().get(ip).map_or(0, |a| a.failed_attempts)
    }
}

#[async_trait::async_trait]
impl LoginAttemptRepositoryTrait for MemoryLoginAttempts {
    async fn get_attempt(&self, ip: &str) -> DatabaseResult<Option<LoginAttempt>> {
        Ok(self.attempts.lock().unwrap().get(ip).cloned())
    }

    async fn record_failure(&self, ip: &str, max_attempts: i32, lock_until: DateTime<Utc>) -> DatabaseResult<LoginAttempt> {
        let mut attempts = self.attempts.lock().unwrap();
        let attempt = attempts.entry(ip.to_string()).or_insert_with(|| LoginAttempt {
            ip: ip.to_string(),
            failed_attempts: 0,
            locked_until: None,
            updated_at: Utc::now(),
        });

        attempt.failed_attempts += 1;
        if attempt.failed_attempts >= max_attempts {
            attempt.locked_until = Some(lock_until);
        }
        attempt.updated_at = Utc::now();

        Ok(attempt.clone())
    }

    async fn reset_attempts(&self, ip: &str) -> DatabaseResult<()> {
        self.attempts.lock().unwrap().remove(ip);
        Ok(())
    }
}

pub struct MemoryStats {
    hits: AtomicI64,
    collections: Arc<MemoryCollections>,
}

impl MemoryStats {
    pub fn hits(&self) -> i64 {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StatsRepositoryTrait for MemoryStats {
    async fn increment_global_hits(&self) -> DatabaseResult<i64> {
        Ok(self.hits.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn get_admin_stats(&self) -> DatabaseResult<AdminStats> {
        let rows = self.collections.rows.lock().unwrap();
        Ok(AdminStats {
            total_hits: self.hits(),
            total_views: rows.iter().map(|c| c.views).sum(),
            project_count: rows.len() as i64,
        })
    }
}

// ---------------------------------------------------------------------------
// 测试应用
// ---------------------------------------------------------------------------

pub fn test_config(storage_root: &Path) -> AppConfig {
    AppConfig {
        postgresql_conn_str: "postgres://unused".to_string(),
        storage_root: storage_root.to_path_buf(),
        bind_addr: "127.0.0.1:0".to_string(),
        max_upload_bytes: 10 * 1024 * 1024,
        max_bundle_bytes: MAX_BUNDLE_BYTES,
        log_level: "debug".to_string(),
        auth: AuthConfig {
            admin_keys: vec![ADMIN_KEY.to_string()],
            jwt_secret: "test-jwt-secret".to_string(),
            session_ttl: Duration::from_secs(3600),
            max_failed_attempts: MAX_ATTEMPTS,
            lock_duration: Duration::from_secs(LOCK_SECONDS),
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub config: Arc<AppConfig>,
    pub collections: Arc<MemoryCollections>,
    pub login_attempts: Arc<MemoryLoginAttempts>,
    pub stats: Arc<MemoryStats>,
    pub storage: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let config = Arc::new(test_config(storage.path()));
        let collections = Arc::new(MemoryCollections::default());
        let login_attempts = Arc::new(MemoryLoginAttempts::default());
        let stats = Arc::new(MemoryStats {
            hits: AtomicI64::new(0),
            collections: collections.clone(),
        });

        let state = AppState {
            collections: collections.clone(),
            login_attempts: login_attempts.clone(),
            stats: stats.clone(),
            bundles: Arc::new(
                BundleStore::new(storage.path())
                    .unwrap()
                    .with_limits(IngestLimits::new(config.max_bundle_bytes)),
            ),
            config: config.clone(),
        };

        Self {
            router: create_app_router(state),
            config,
            collections,
            login_attempts,
            stats,
            storage,
        }
    }

    pub fn admin_token(&self) -> String {
        issue_token(&self.config.auth, Utc::now()).unwrap().0
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// 上传运行包，返回存储标识
    pub async fn upload(&self, files: &[(&str, &[u8])]) -> String {
        let response = self.send(multipart_upload(files, Some(&self.admin_token()))).await;
        assert_eq!(response.status(), 200);
        body_json(response).await["data"]["storage_id"].as_str().unwrap().to_string()
    }

    /// 创建作品集，返回作品集ID
    pub async fn create_collection(&self, payload: serde_json::Value) -> String {
        let token = self.admin_token();
        let response = self
            .send(json_request(Method::POST, "/api/v1/collections", &payload, Some(&token)))
            .await;
        assert_eq!(response.status(), 200);
        body_json(response).await["data"]["id"].as_str().unwrap().to_string()
    }

    /// 上传运行包并创建对应的 `run` 作品集，返回 (作品集ID, 存储标识)
    pub async fn create_run_collection(&self, files: &[(&str, &[u8])]) -> (String, String) {
        let storage_id = self.upload(files).await;
        let id = self
            .create_collection(serde_json::json!({
                "kind": "run",
                "name": "Demo",
                "description": "A bundled demo",
                "storage_id": storage_id,
            }))
            .await;
        (id, storage_id)
    }
}

// ---------------------------------------------------------------------------
// 请求构造
// ---------------------------------------------------------------------------

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, payload: &serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

/// 构造 `file` 字段的 multipart 上传请求
pub fn multipart_upload(files: &[(&str, &[u8])], token: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, content) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    multipart_request(body, token)
}

/// 只包含普通文本字段的 multipart 请求
pub fn multipart_without_files(token: Option<&str>) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    multipart_request(body.into_bytes(), token)
}

fn multipart_request(body: Vec<u8>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/upload/run")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// 使用 deflate 压缩，体积远小于解压后的内容
pub fn build_deflated_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ---------------------------------------------------------------------------
// 响应读取
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
