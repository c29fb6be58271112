use color_eyre::eyre::ContextCompat;
use color_eyre::{Help, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// 管理员鉴权配置
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// 可用于登录的管理员密钥
    ///
    /// 至少包含 `ADMIN_KEY`，可选再加上 `ADMIN_RECOVERY_KEY`，空字符串会被忽略
    pub admin_keys: Vec<String>,

    /// 管理员会话令牌(HS256)签名密钥
    pub jwt_secret: String,

    /// 会话有效期
    ///
    /// 可通过环境变量 `SESSION_TTL_HOURS` 来调整，默认24小时
    pub session_ttl: Duration,

    /// 连续失败多少次之后锁定
    ///
    /// 可通过环境变量 `LOGIN_MAX_ATTEMPTS` 来调整
    pub max_failed_attempts: i32,

    /// 锁定时长
    ///
    /// 可通过环境变量 `LOGIN_LOCK_SECONDS` 来调整
    pub lock_duration: Duration,
}

/// 程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// postgresql数据库链接字符串
    pub postgresql_conn_str: String,

    /// 上传内容的存储根目录，运行包位于 `<storage_root>/run/<storage_id>/`
    pub storage_root: PathBuf,

    /// 服务监听地址
    pub bind_addr: String,

    /// 单次上传请求体的最大字节数
    pub max_upload_bytes: usize,

    /// 单个运行包写入磁盘的最大字节数，压缩包按解压后计算
    pub max_bundle_bytes: u64,

    /// 日志级别
    pub log_level: String,

    /// 鉴权配置
    pub auth: AuthConfig,
}

const DEFAULT_STORAGE_PATH: &str = "./storage";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_TTL_HOURS: u64 = 24;
const DEFAULT_LOGIN_MAX_ATTEMPTS: i32 = 3;
const DEFAULT_LOGIN_LOCK_SECONDS: u64 = 300;
const DEFAULT_MAX_UPLOAD_MB: u64 = 100;
const DEFAULT_MAX_BUNDLE_MB: u64 = 512;

const MIB: u64 = 1024 * 1024;
const HOUR_SECS: u64 = 3600;

impl AppConfig {
    pub fn load() -> Result<Arc<AppConfig>> {
        // 加载.env文件中的数据注入到环境变量中，方便本地测试
        // 线上环境部署时会直接使用环境变量，不需要.env文件
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!("未加载 .env 文件: {err}");
        }

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        Ok(Arc::new(config))
    }

    /// 从任意键值来源构建配置，`load` 使用进程环境变量
    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 读取数据库地址信息（仅支持postgresql）
        let db_url = lookup("DATABASE_URL")
            .context("Can not load DATABASE_URL in environment")
            .suggestion("设置 DATABASE_URL 环境变量")?;

        let admin_key = lookup("ADMIN_KEY")
            .filter(|k| !k.is_empty())
            .context("Can not load ADMIN_KEY in environment")
            .suggestion("设置非空的 ADMIN_KEY 环境变量")?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|k| !k.is_empty())
            .context("Can not load JWT_SECRET in environment")
            .suggestion("设置非空的 JWT_SECRET 环境变量")?;

        let mut admin_keys = vec![admin_key];
        if let Some(recovery) = lookup("ADMIN_RECOVERY_KEY").filter(|k| !k.is_empty()) {
            admin_keys.push(recovery);
        }

        let parse_or = |key: &str, default: u64| -> u64 {
            lookup(key).map_or(default, |s| s.parse().unwrap_or(default))
        };
        // 换算单位时溢出的值和格式错误的值一样回退到默认值
        let scaled_or = |key: &str, default: u64, unit: u64| -> u64 {
            parse_or(key, default).checked_mul(unit).unwrap_or(default * unit)
        };

        Ok(AppConfig {
            postgresql_conn_str: db_url,
            storage_root: PathBuf::from(lookup("STORAGE_PATH").unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string())),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_upload_bytes: usize::try_from(scaled_or("MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB, MIB))
                .unwrap_or(usize::MAX),
            max_bundle_bytes: scaled_or("MAX_BUNDLE_MB", DEFAULT_MAX_BUNDLE_MB, MIB),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            auth: AuthConfig {
                admin_keys,
                jwt_secret,
                session_ttl: Duration::from_secs(scaled_or("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS, HOUR_SECS)),
                max_failed_attempts: lookup("LOGIN_MAX_ATTEMPTS")
                    .map_or(DEFAULT_LOGIN_MAX_ATTEMPTS, |s| s.parse().unwrap_or(DEFAULT_LOGIN_MAX_ATTEMPTS)),
                lock_duration: Duration::from_secs(parse_or("LOGIN_LOCK_SECONDS", DEFAULT_LOGIN_LOCK_SECONDS)),
            },
        })
    }
}
