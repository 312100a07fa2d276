//! 过滤条件
//!
//! 与后端过滤 DSL 对应的过滤表达式，附带元数据

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterMeta {
    pub index: String,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
    pub meta: FilterMeta,
    pub query: Value,
}

impl FilterExpression {
    pub fn new(index: impl Into<String>, key: Option<String>, query: Value) -> Self {
        Self {
            meta: FilterMeta {
                index: index.into(),
                key,
                ..FilterMeta::default()
            },
            query,
        }
    }

    /// 字段精确短语匹配
    pub fn phrase(index: impl Into<String>, field: &str, value: &Value) -> Self {
        Self::new(
            index,
            Some(field.to_string()),
            json!({ "match_phrase": { field: value } }),
        )
    }

    /// 半开区间 `[gte, lt)`，任一端可省略
    pub fn range(
        index: impl Into<String>,
        field: &str,
        gte: Option<Value>,
        lt: Option<Value>,
        format: Option<&str>,
    ) -> Self {
        let mut bounds = serde_json::Map::new();
        if let Some(gte) = gte {
            bounds.insert("gte".to_string(), gte);
        }
        if let Some(lt) = lt {
            bounds.insert("lt".to_string(), lt);
        }
        if let Some(format) = format {
            bounds.insert("format".to_string(), Value::String(format.to_string()));
        }
        Self::new(
            index,
            Some(field.to_string()),
            json!({ "range": { field: Value::Object(bounds) } }),
        )
    }

    pub fn query_string(index: impl Into<String>, query: &str) -> Self {
        Self::new(
            index,
            None,
            json!({ "query_string": { "query": query, "analyze_wildcard": true } }),
        )
    }

    pub fn negated(mut self) -> Self {
        self.meta.negate = !self.meta.negate;
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.meta.disabled
    }
}
