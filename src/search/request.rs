//! 搜索请求
//!
//! 发送给后端的请求体及其构造辅助

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::params::SortOrder;
use crate::agg::FilterExpression;

/// 排序子句
#[derive(Debug, Clone, PartialEq)]
pub enum SortClause {
    Field { field: String, order: SortOrder },
    /// 按文档内部顺序的确定性兜底排序
    Doc,
}

impl Serialize for SortClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            SortClause::Field { field, order } => {
                map.serialize_entry(field, &json!({ "order": order.as_str() }))?;
            }
            SortClause::Doc => {
                map.serialize_entry("_doc", &json!({}))?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptField {
    pub script: Script,
}

impl ScriptField {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            script: Script {
                source: source.into(),
            },
        }
    }
}

/// 时间范围
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub field: String,
    pub from: String,
    pub to: String,
}

impl TimeRange {
    pub fn to_query(&self) -> Value {
        json!({
            "range": {
                self.field.as_str(): {
                    "gte": self.from,
                    "lte": self.to,
                    "format": "strict_date_optional_time"
                }
            }
        })
    }
}

/// 透传给后端的请求选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestOptions {
    pub partial_rows: bool,
    pub metrics_at_all_levels: bool,
    pub force_fetch: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchRequest {
    #[serde(skip)]
    pub index: String,
    #[serde(skip)]
    pub options: RequestOptions,
    pub size: u64,
    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docvalue_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_fields: Option<BTreeMap<String, ScriptField>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggs: Option<Value>,
}

impl SearchRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Self::default()
        }
    }

    pub fn to_body(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// 由查询、时间范围和过滤条件组合出 bool 查询，全部为空时返回 None
pub fn build_query(
    query: Option<&Value>,
    time_range: Option<&TimeRange>,
    filters: &[FilterExpression],
) -> Option<Value> {
    let mut must = Vec::new();
    let mut filter = Vec::new();
    let mut must_not = Vec::new();

    if let Some(query) = query {
        must.push(query.clone());
    }
    if let Some(range) = time_range {
        filter.push(range.to_query());
    }
    for f in filters.iter().filter(|f| f.is_enabled()) {
        if f.meta.negate {
            must_not.push(f.query.clone());
        } else {
            filter.push(f.query.clone());
        }
    }

    if must.is_empty() && filter.is_empty() && must_not.is_empty() {
        return None;
    }
    Some(json!({
        "bool": {
            "must": must,
            "filter": filter,
            "must_not": must_not
        }
    }))
}
