//! 存储标识分配器
//!
//! 生成短小、URL安全、高熵的随机标识。标识只依赖随机源，不会回查存储目录判重，
//! 碰撞概率（64字符表 × 21位，约126 bit）视为可以忽略。
//!
//! 运行包的存储标识与项目记录自身的ID是两个独立的标识空间，但都由这里生成。

use crate::error::{StorageError, StorageResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL安全字符表
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_-";

/// 生成标识的长度
pub const ID_LENGTH: usize = 21;

/// 允许解析的最大标识长度
const MAX_ID_LENGTH: usize = 64;

/// 生成一个新的随机标识
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// 运行包存储标识
///
/// 与 `<storage_root>/run/<storage_id>/` 目录一一对应，分配后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageId(String);

impl StorageId {
    /// 分配一个新的存储标识
    pub fn allocate() -> Self {
        Self(generate_id())
    }

    /// 解析外部传入的存储标识
    ///
    /// 只接受字符表内的字符，因此 `..`、`/` 之类的值不可能被当作目录名使用。
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_ID_LENGTH
            && raw.bytes().all(|b| ALPHABET.contains(&b));

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(StorageError::InvalidStorageId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_url_safe() {
        let id = generate_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-'));
    }

    #[test]
    fn test_no_collisions_in_ten_thousand_allocations() {
        let ids: HashSet<StorageId> = (0..10_000).map(|_| StorageId::allocate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_parse_accepts_allocated_ids() {
        let id = StorageId::allocate();
        assert_eq!(StorageId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_path_like_values() {
        for raw in ["", "..", ".", "a/b", "a\\b", "abc%2F", "name.zip"] {
            assert!(
                matches!(StorageId::parse(raw), Err(StorageError::InvalidStorageId)),
                "{raw:?} should be rejected"
            );
        }
        assert!(StorageId::parse(&"a".repeat(65)).is_err());
    }
}
