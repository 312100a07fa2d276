//! 结果节点集成测试
//!
//! 测试范围：
//! - 共享聚合定义的格式化器缓存
//! - 显示规范化
//! - 祖先路径与过滤条件

mod common;

use agg_table_loader::agg::{
    AggConfig, AggConfigSpec, AggDefinition, AggIdentity, AggKind, FilterExpression,
};
use agg_table_loader::format::{
    field_formatter, ContentType, FieldFormat, Formatter, FormatterCache, PageLocation,
    PassthroughPolicy,
};
use agg_table_loader::result::{ResultKind, ResultNode};
use common::data_fixtures::INDEX;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 统计格式化器构造次数的聚合定义
#[derive(Debug)]
struct CountingAgg {
    identity: AggIdentity,
    format: FieldFormat,
    constructed: AtomicUsize,
}

impl CountingAgg {
    fn new(identity: u64, format: FieldFormat) -> Arc<Self> {
        Arc::new(Self {
            identity: AggIdentity(identity),
            format,
            constructed: AtomicUsize::new(0),
        })
    }

    fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }
}

impl AggDefinition for CountingAgg {
    fn identity(&self) -> AggIdentity {
        self.identity
    }

    fn id(&self) -> &str {
        "3"
    }

    fn kind(&self) -> AggKind {
        AggKind::Metrics
    }

    fn create_filter(&self, _key: &Value) -> Option<FilterExpression> {
        None
    }

    fn field_formatter(&self, content_type: ContentType) -> Formatter {
        self.constructed.fetch_add(1, Ordering::SeqCst);
        field_formatter(&self.format, content_type)
    }
}

fn br_number() -> FieldFormat {
    FieldFormat::Number {
        decimals: 2,
        decimal_separator: ',',
        group_separator: Some('.'),
    }
}

fn br_currency(decimals: usize) -> FieldFormat {
    FieldFormat::Currency {
        prefix: "R$".to_string(),
        decimals,
        decimal_separator: ',',
        group_separator: Some('.'),
    }
}

fn metric(format: FieldFormat) -> Arc<dyn AggDefinition> {
    Arc::new(
        AggConfig::from_spec(
            AggConfigSpec::new("3", "sum", "metric").with_param("field", json!("amount")),
            INDEX,
        )
        .with_format(format),
    )
}

// ==================== 格式化器缓存 ====================

#[test]
fn test_siblings_share_one_formatter() {
    let cache = FormatterCache::default();
    let agg = CountingAgg::new(9_000_001, br_number());
    let shared: Arc<dyn AggDefinition> = agg.clone();

    let first = ResultNode::new(shared.clone(), None, json!(1), json!("3"), None);
    let second = ResultNode::new(shared.clone(), None, json!(2.5), json!("3"), None);

    assert_eq!(first.to_display_string(&cache, None), "1");
    assert_eq!(second.to_display_string(&cache, None), "2,50");
    assert_eq!(first.to_display_string(&cache, Some(ContentType::Text)), "1");
    assert_eq!(agg.constructed(), 1);

    second.to_display_string(&cache, Some(ContentType::Html));
    assert_eq!(agg.constructed(), 2);
    assert_eq!(cache.stats().cache_size, 2);
}

#[test]
fn test_distinct_definitions_do_not_share() {
    let cache = FormatterCache::default();
    let a = CountingAgg::new(9_000_002, br_number());
    let b = CountingAgg::new(9_000_003, br_number());

    ResultNode::new(a.clone(), None, json!(1), json!("3"), None).to_display_string(&cache, None);
    ResultNode::new(b.clone(), None, json!(1), json!("3"), None).to_display_string(&cache, None);

    assert_eq!(a.constructed(), 1);
    assert_eq!(b.constructed(), 1);
}

// ==================== 显示规范化 ====================

#[test]
fn test_zero_fraction_stripped() {
    let cache = FormatterCache::default();
    let node = ResultNode::new(metric(br_number()), None, json!(1), json!("3"), None);
    assert_eq!(node.to_display_string(&cache, None), "1");
}

#[test]
fn test_currency_padded() {
    let cache = FormatterCache::default();
    let node = ResultNode::new(metric(br_currency(0)), None, json!(1), json!("3"), None);
    assert_eq!(node.to_display_string(&cache, None), "R$1,00");
}

#[test]
fn test_non_zero_fraction_and_full_currency_unchanged() {
    let cache = FormatterCache::default();
    let node = ResultNode::new(metric(br_number()), None, json!(1.5), json!("3"), None);
    assert_eq!(node.to_display_string(&cache, None), "1,50");

    let node = ResultNode::new(metric(br_currency(2)), None, json!(1), json!("3"), None);
    assert_eq!(node.to_display_string(&cache, None), "R$1,00");
}

#[test]
fn test_passthrough_policy() {
    let cache = FormatterCache::new(
        PageLocation::new("http://localhost:5601", "/app/kibana"),
        "/app/kibana",
        Arc::new(PassthroughPolicy),
    );
    let node = ResultNode::new(metric(br_number()), None, json!(1), json!("3"), None);
    assert_eq!(node.to_display_string(&cache, None), "1,00");
}

// ==================== 路径与过滤 ====================

#[test]
fn test_table_row_path_and_filters() {
    let host = Arc::new(AggConfig::from_spec(
        AggConfigSpec::new("2", "terms", "bucket").with_param("field", json!("host")),
        INDEX,
    ));
    let status = Arc::new(AggConfig::from_spec(
        AggConfigSpec::new("4", "terms", "bucket").with_param("field", json!("status")),
        INDEX,
    ));

    let host_node = ResultNode::new(host, None, json!(120), json!("web-1"), None);
    let status_node = ResultNode::new(status, Some(&host_node), json!(7), json!(500), None);
    let sum_node = ResultNode::new(metric(br_number()), Some(&status_node), json!(10), json!("3"), None);

    let path = sum_node.ancestry_path();
    let kinds: Vec<ResultKind> = path.iter().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![ResultKind::Bucket, ResultKind::Bucket, ResultKind::Metric]);

    let filters: Vec<FilterExpression> = path.iter().filter_map(|n| n.create_filter()).collect();
    assert_eq!(filters.len(), 2);
    assert_eq!(filters[0].query, json!({ "match_phrase": { "host": "web-1" } }));
    assert_eq!(filters[1].query, json!({ "match_phrase": { "status": 500 } }));
}

#[test]
fn test_explicit_filters_override_derived() {
    let host = Arc::new(AggConfig::from_spec(
        AggConfigSpec::new("2", "terms", "bucket").with_param("field", json!("host")),
        INDEX,
    ));
    let explicit = FilterExpression::query_string(INDEX, "host:web-* AND NOT status:200");
    let node = ResultNode::new(host, None, json!(3), json!("web-1"), Some(explicit.clone()));

    assert_eq!(node.create_filter(), Some(explicit));
}
