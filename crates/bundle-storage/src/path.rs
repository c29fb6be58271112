//! 路径规范化与包含检查
//!
//! 上传写入和文件读取使用同一套规则：先把 `base.join(relative)` 按词法规范化
//! （处理 `.` 与 `..`，不访问文件系统），再要求结果仍位于 `base` 之下。

use std::path::{Component, Path, PathBuf};

/// 词法规范化路径，不要求路径存在，也不跟随符号链接
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // 根目录之上没有父目录
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// 把相对路径拼接到 `base` 下并规范化，越界时返回 `None`
///
/// `base` 需要是已经规范化的绝对路径。`relative` 为绝对路径时 `join` 会整体替换，
/// 同样会被判定为越界。
pub fn join_within(base: &Path, relative: &Path) -> Option<PathBuf> {
    let target = normalize(&base.join(relative));
    target.starts_with(base).then_some(target)
}
