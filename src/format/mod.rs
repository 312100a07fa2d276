//! 显示格式化模块
//!
//! 提供聚合结果值的显示格式化支持：
//! - 内容类型（text / html）
//! - 字段格式化器
//! - 页面地址派生的格式化选项
//! - 显示规范化策略
//! - 按聚合定义共享的格式化器缓存

pub mod cache;
pub mod formatter;
pub mod options;
pub mod policy;

pub use cache::*;
pub use formatter::*;
pub use options::*;
pub use policy::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 格式化输出的内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Html => "html",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "html" => Ok(ContentType::Html),
            other => Err(format!("未知的内容类型: {}", other)),
        }
    }
}
