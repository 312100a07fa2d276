//! 搜索响应

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 命中总数，兼容数字和 `{value, relation}` 两种形式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Count(n) => *n,
            TotalHits::Object { value, .. } => *value,
        }
    }
}

/// 一条命中的文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Hit {
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
    /// 排序值，作为下一页的游标
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub hits: Option<Hits>,
    #[serde(default)]
    pub aggregations: Option<Value>,
}

impl SearchResponse {
    /// 命中总数，不可用时为 -1
    pub fn total_hits(&self) -> i64 {
        self.hits
            .as_ref()
            .and_then(|hits| hits.total.as_ref())
            .map(|total| total.value() as i64)
            .unwrap_or(-1)
    }

    pub fn hit_count(&self) -> usize {
        self.hits.as_ref().map(|hits| hits.hits.len()).unwrap_or(0)
    }

    pub fn into_hits(self) -> Vec<Hit> {
        self.hits.map(|hits| hits.hits).unwrap_or_default()
    }
}
