//! 聚合树
//!
//! 一次请求使用的全部聚合定义，按声明顺序保存

use serde_json::{Map, Value};
use std::sync::Arc;

use super::{AggConfig, AggConfigSpec, AggDefinition, AggKind};

#[derive(Debug, Clone, Default)]
pub struct AggConfigs {
    index_pattern: String,
    aggs: Vec<Arc<AggConfig>>,
}

impl AggConfigs {
    pub fn new(index_pattern: impl Into<String>) -> Self {
        Self {
            index_pattern: index_pattern.into(),
            aggs: Vec::new(),
        }
    }

    pub fn from_specs(index_pattern: impl Into<String>, specs: Vec<AggConfigSpec>) -> Self {
        let mut configs = Self::new(index_pattern);
        for spec in specs {
            configs.create_agg_config(spec);
        }
        configs
    }

    /// 按描述创建聚合定义并追加到树中
    pub fn create_agg_config(&mut self, spec: AggConfigSpec) -> Arc<AggConfig> {
        let agg = Arc::new(AggConfig::from_spec(spec, self.index_pattern.clone()));
        self.aggs.push(agg.clone());
        agg
    }

    pub fn index_pattern(&self) -> &str {
        &self.index_pattern
    }

    pub fn len(&self) -> usize {
        self.aggs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<AggConfig>> {
        self.aggs.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<AggConfig>> {
        self.aggs.iter().find(|agg| agg.id() == id)
    }

    /// 请求体中的 `aggs` 部分
    ///
    /// 桶聚合按声明顺序逐层嵌套，指标聚合放在最内层；
    /// `metrics_at_all_levels` 为真时每一层桶下都挂指标
    pub fn to_dsl(&self, metrics_at_all_levels: bool) -> Option<Value> {
        let enabled = || self.aggs.iter().filter(|agg| agg.enabled());
        let buckets: Vec<&Arc<AggConfig>> =
            enabled().filter(|agg| agg.kind() == AggKind::Buckets).collect();

        let mut metrics = Map::new();
        for agg in enabled().filter(|agg| agg.kind() == AggKind::Metrics) {
            if let Some(dsl) = agg.to_dsl() {
                metrics.insert(agg.id().to_string(), dsl);
            }
        }

        let mut inner = metrics.clone();
        for (depth, bucket) in buckets.iter().enumerate().rev() {
            let Some(Value::Object(mut body)) = bucket.to_dsl() else {
                continue;
            };
            let mut children = inner;
            if metrics_at_all_levels && depth + 1 < buckets.len() {
                children.extend(metrics.clone());
            }
            if !children.is_empty() {
                body.insert("aggs".to_string(), Value::Object(children));
            }
            inner = Map::new();
            inner.insert(bucket.id().to_string(), Value::Object(body));
        }

        if inner.is_empty() {
            None
        } else {
            Some(Value::Object(inner))
        }
    }
}
