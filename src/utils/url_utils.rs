// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

const SCHEME_SEPARATOR: &str = "://";

/// 规范化爬取URL
///
/// 没有协议时补全为 `https://`，去掉第一个 `?` 及其后的内容，
/// 再去掉一个结尾的 `/`
pub fn normalize_crawl_url(input: &str) -> String {
    let trimmed = input.trim();
    let mut url = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    if let Some(pos) = url.find('?') {
        url.truncate(pos);
    }
    if url.ends_with('/') {
        url.pop();
    }
    url
}

/// 生成引擎种子列表
///
/// 第一个种子总是规范化后的URL；输入没有指定协议时，
/// 额外加入 `http://` 版本作为备用种子
pub fn seed_urls(input: &str) -> Vec<String> {
    let normalized = normalize_crawl_url(input);
    if has_scheme(input.trim()) {
        return vec![normalized];
    }
    let fallback = normalized.replacen("https://", "http://", 1);
    vec![normalized, fallback]
}

/// 检查规范化后的URL是否可以爬取
pub fn is_crawlable(normalized: &str) -> bool {
    match Url::parse(normalized) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// 输入是否以 `scheme://` 开头
///
/// 分隔符必须出现在第一个 `/` 或 `?` 之前，查询参数里的URL不算
fn has_scheme(input: &str) -> bool {
    let Some(pos) = input.find(SCHEME_SEPARATOR) else {
        return false;
    };
    let scheme = &input[..pos];
    !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
