//! 运行包沙箱嵌入策略
//!
//! 运行包是不受信任的 HTML/JS，只能放在 `sandbox` iframe 中展示：
//!
//! - 允许脚本、表单、弹窗和模态框，保证演示可以正常运行
//! - 不授予 `allow-same-origin`，运行包拿不到宿主页面的 Cookie 和存储
//! - 不授予 `allow-top-navigation` 和 `allow-popups-to-escape-sandbox`
//!
//! 缩略图是不可交互的预览，只保留脚本执行，并禁用指针事件和键盘焦点。
//!
//! 运行包的 HTTP 响应同时携带 `Content-Security-Policy: sandbox ...`，
//! 直接在顶层窗口打开运行包地址时同样受到限制。

/// iframe `sandbox` 属性中的单个授权
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxFlag {
    AllowScripts,
    AllowForms,
    AllowModals,
    AllowPopups,
}

impl SandboxFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllowScripts => "allow-scripts",
            Self::AllowForms => "allow-forms",
            Self::AllowModals => "allow-modals",
            Self::AllowPopups => "allow-popups",
        }
    }
}

/// 一组沙箱授权以及渲染方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxPolicy {
    flags: &'static [SandboxFlag],
    interactive: bool,
}

/// 全页运行
pub const RUNNER: SandboxPolicy = SandboxPolicy {
    flags: &[
        SandboxFlag::AllowScripts,
        SandboxFlag::AllowForms,
        SandboxFlag::AllowModals,
        SandboxFlag::AllowPopups,
    ],
    interactive: true,
};

/// 列表中的缩略图预览
pub const THUMBNAIL: SandboxPolicy = SandboxPolicy {
    flags: &[SandboxFlag::AllowScripts],
    interactive: false,
};

/// 运行包响应头中的 CSP，与 [`RUNNER`] 的授权保持一致
pub const RUNNER_CSP: &str = "sandbox allow-scripts allow-forms allow-modals allow-popups";

impl SandboxPolicy {
    pub fn allows(&self, flag: SandboxFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// `sandbox` 属性值
    pub fn attribute(&self) -> String {
        self.flags.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(" ")
    }

    /// 按策略渲染 iframe 标签，`src` 和 `title` 会做属性转义
    pub fn iframe(&self, src: &str, title: &str) -> String {
        let mut html = format!(
            r#"<iframe src="{}" title="{}" sandbox="{}" referrerpolicy="no-referrer""#,
            escape_attr(src),
            escape_attr(title),
            self.attribute()
        );

        if self.interactive {
            html.push_str(r#" allow="fullscreen""#);
        } else {
            html.push_str(r#" tabindex="-1" loading="lazy" aria-hidden="true" style="pointer-events: none""#);
        }

        html.push_str("></iframe>");
        html
    }
}

/// HTML 属性转义
pub fn escape_attr(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// 完整的嵌入页面
pub fn render_page(policy: &SandboxPolicy, src: &str, title: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>html,body{{margin:0;height:100%;overflow:hidden;background:#111}}iframe{{display:block;border:0;width:100%;height:100%}}</style>
</head>
<body>
{iframe}
</body>
</html>
"#,
        title = escape_attr(title),
        iframe = policy.iframe(src, title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_attribute_matches_csp() {
        assert_eq!(RUNNER.attribute(), "allow-scripts allow-forms allow-modals allow-popups");
        assert_eq!(RUNNER_CSP, format!("sandbox {}", RUNNER.attribute()));
    }

    #[test]
    fn test_thumbnail_is_script_only() {
        assert_eq!(THUMBNAIL.attribute(), "allow-scripts");
        assert!(!THUMBNAIL.allows(SandboxFlag::AllowForms));
        assert!(!THUMBNAIL.is_interactive());
    }

    #[test]
    fn test_runner_never_grants_escape_flags() {
        let attribute = RUNNER.attribute();
        for forbidden in ["allow-same-origin", "allow-top-navigation", "allow-popups-to-escape-sandbox"] {
            assert!(!attribute.contains(forbidden), "{forbidden}");
        }
    }

    #[test]
    fn test_thumbnail_iframe_disables_interaction() {
        let html = THUMBNAIL.iframe("/runner/abc/", "demo");
        assert!(html.contains(r#"sandbox="allow-scripts""#));
        assert!(html.contains("pointer-events: none"));
        assert!(html.contains(r#"tabindex="-1""#));
        assert!(html.contains(r#"loading="lazy""#));
    }

    #[test]
    fn test_iframe_escapes_attributes() {
        let html = RUNNER.iframe(r#"https://example.com/?a=1&b="x""#, "<script>");
        assert!(html.contains(r#"src="https://example.com/?a=1&amp;b=&quot;x&quot;""#));
        assert!(html.contains(r#"title="&lt;script&gt;""#));
        assert!(!html.contains("<script>"));
    }
}
