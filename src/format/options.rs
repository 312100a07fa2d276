//! 格式化选项
//!
//! 由当前页面地址派生，按聚合定义缓存一次

use serde::{Deserialize, Serialize};

/// 页面地址
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    pub origin: String,
    pub pathname: String,
}

impl PageLocation {
    pub fn new(origin: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            pathname: pathname.into(),
        }
    }
}

/// 解析后的页面地址
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUrl {
    pub origin: String,
    pub pathname: String,
    pub base_path: String,
}

/// 传递给字段格式化器的选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterOptions {
    pub parsed_url: ParsedUrl,
}

impl FormatterOptions {
    pub fn from_location(location: &PageLocation, app_root_marker: &str) -> Self {
        Self {
            parsed_url: ParsedUrl {
                origin: location.origin.clone(),
                pathname: location.pathname.clone(),
                base_path: compute_base_path(&location.pathname, app_root_marker),
            },
        }
    }
}

/// 截取 pathname 中第一个应用根标记之前的部分，不存在时返回空串
pub fn compute_base_path(pathname: &str, app_root_marker: &str) -> String {
    if pathname.is_empty() || app_root_marker.is_empty() {
        return String::new();
    }
    match pathname.find(app_root_marker) {
        Some(end) => pathname[..end].to_string(),
        None => String::new(),
    }
}
