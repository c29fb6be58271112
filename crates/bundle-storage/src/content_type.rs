//! 根据扩展名判断响应的 `Content-Type`

use std::path::Path;

/// 未知扩展名使用的类型
pub const OCTET_STREAM: &str = "application/octet-stream";

/// 扩展名（不含点，小写）到MIME类型的映射
const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("css", "text/css"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("json", "application/json"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
];

/// 扩展名分类，大小写不敏感，允许带前导 `.`
///
/// ```
/// use bundle_storage::classify;
///
/// assert_eq!(classify(".HTML"), classify("html"));
/// assert_eq!(classify("exe"), "application/octet-stream");
/// ```
pub fn classify(extension: &str) -> &'static str {
    let ext = extension.strip_prefix('.').unwrap_or(extension);

    MIME_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or(OCTET_STREAM)
}

/// 按文件路径的扩展名分类
pub fn classify_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(classify)
        .unwrap_or(OCTET_STREAM)
}
