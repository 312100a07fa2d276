//! 聚合定义

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AggDefinition, AggIdentity, AggKind, FilterExpression};
use crate::format::{field_formatter, ContentType, FieldFormat, Formatter};
use crate::utils::id_generator::agg_identity_generator;

fn default_enabled() -> bool {
    true
}

fn default_schema() -> String {
    "metric".to_string()
}

/// 聚合定义的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggConfigSpec {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub format: Option<FieldFormat>,
}

impl AggConfigSpec {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            type_name: type_name.into(),
            schema: schema.into(),
            params: Map::new(),
            format: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// 聚合树为空时补充的计数指标
    pub fn default_count() -> Self {
        Self::new("1", "count", "metric")
    }
}

/// 具体的聚合定义
#[derive(Debug, Clone)]
pub struct AggConfig {
    identity: AggIdentity,
    id: String,
    enabled: bool,
    type_name: String,
    schema: String,
    params: Map<String, Value>,
    index_pattern: String,
    format: FieldFormat,
}

impl AggConfig {
    pub fn from_spec(spec: AggConfigSpec, index_pattern: impl Into<String>) -> Self {
        Self {
            identity: AggIdentity(agg_identity_generator().id()),
            id: spec.id,
            enabled: spec.enabled,
            type_name: spec.type_name,
            schema: spec.schema,
            params: spec.params,
            index_pattern: index_pattern.into(),
            format: spec.format.unwrap_or_default(),
        }
    }

    pub fn with_format(mut self, format: FieldFormat) -> Self {
        self.format = format;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn field(&self) -> Option<&str> {
        self.params.get("field").and_then(Value::as_str)
    }

    pub fn format(&self) -> &FieldFormat {
        &self.format
    }

    /// 该聚合在请求体中的 DSL，count 指标不需要 DSL
    pub fn to_dsl(&self) -> Option<Value> {
        if self.type_name == "count" {
            return None;
        }
        let mut body = Map::new();
        body.insert(self.type_name.clone(), Value::Object(self.params.clone()));
        Some(Value::Object(body))
    }

    fn interval_filter(&self, field: &str, key: &Value) -> Option<FilterExpression> {
        let start = key.as_f64()?;
        let (interval, format) = if self.type_name == "date_histogram" {
            let interval = self
                .params
                .get("interval")
                .or_else(|| self.params.get("fixed_interval"))
                .and_then(Value::as_str)
                .and_then(parse_interval_ms)?;
            (interval, Some("epoch_millis"))
        } else {
            (self.params.get("interval").and_then(Value::as_f64)?, None)
        };
        Some(FilterExpression::range(
            self.index_pattern.clone(),
            field,
            Some(key.clone()),
            Some(serde_json::json!(start + interval)),
            format,
        ))
    }
}

/// 解析 `30s` / `5m` / `1d` 这类固定间隔，返回毫秒数
pub fn parse_interval_ms(interval: &str) -> Option<f64> {
    let interval = interval.trim();
    let split = interval.find(|c: char| !c.is_ascii_digit() && c != '.')?;
    let (amount, unit) = interval.split_at(split);
    let amount: f64 = amount.parse().ok()?;
    let unit_ms = match unit {
        "ms" => 1.0,
        "s" => 1_000.0,
        "m" => 60_000.0,
        "h" => 3_600_000.0,
        "d" => 86_400_000.0,
        "w" => 604_800_000.0,
        _ => return None,
    };
    Some(amount * unit_ms)
}

impl AggDefinition for AggConfig {
    fn identity(&self) -> AggIdentity {
        self.identity
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> AggKind {
        AggKind::of_type(&self.type_name)
    }

    fn create_filter(&self, key: &Value) -> Option<FilterExpression> {
        if self.kind() == AggKind::Metrics {
            return None;
        }

        match self.type_name.as_str() {
            "filters" => key
                .as_str()
                .map(|q| FilterExpression::query_string(self.index_pattern.clone(), q)),
            "histogram" | "date_histogram" => {
                let field = self.field()?;
                self.interval_filter(field, key)
            }
            "range" | "date_range" | "ip_range" => {
                let field = self.field()?;
                let bounds = key.as_object()?;
                Some(FilterExpression::range(
                    self.index_pattern.clone(),
                    field,
                    bounds.get("from").filter(|v| !v.is_null()).cloned(),
                    bounds.get("to").filter(|v| !v.is_null()).cloned(),
                    None,
                ))
            }
            _ => {
                let field = self.field()?;
                Some(FilterExpression::phrase(self.index_pattern.clone(), field, key))
            }
        }
    }

    fn field_formatter(&self, content_type: ContentType) -> Formatter {
        field_formatter(&self.format, content_type)
    }
}
