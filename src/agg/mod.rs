//! 聚合配置模块
//!
//! 可视化聚合配置的最小模型：
//! - `AggDefinition`：结果节点依赖的聚合定义接口
//! - `AggConfig`：具体的聚合定义
//! - `AggConfigs`：一次请求的聚合树
//! - `FilterExpression`：由聚合结果派生的过滤条件

pub mod config;
pub mod configs;
pub mod filter;

pub use config::*;
pub use configs::*;
pub use filter::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::format::{ContentType, Formatter};

/// 聚合定义的进程内身份，格式化缓存以此为键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AggIdentity(pub u64);

impl fmt::Display for AggIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agg#{}", self.0)
    }
}

/// 聚合类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggKind {
    Buckets,
    Metrics,
}

const BUCKET_TYPES: &[&str] = &[
    "terms",
    "significant_terms",
    "histogram",
    "date_histogram",
    "range",
    "date_range",
    "ip_range",
    "filters",
    "geohash_grid",
];

impl AggKind {
    /// 按聚合类型名分类
    pub fn of_type(type_name: &str) -> Self {
        if BUCKET_TYPES.contains(&type_name) {
            AggKind::Buckets
        } else {
            AggKind::Metrics
        }
    }
}

/// 聚合定义接口
pub trait AggDefinition: Send + Sync + fmt::Debug {
    fn identity(&self) -> AggIdentity;

    fn id(&self) -> &str;

    fn kind(&self) -> AggKind;

    /// 生成只匹配该 key 对应文档的过滤条件，不支持过滤的聚合返回 None
    fn create_filter(&self, key: &Value) -> Option<FilterExpression>;

    /// 构造指定内容类型的字段格式化器
    fn field_formatter(&self, content_type: ContentType) -> Formatter;
}
