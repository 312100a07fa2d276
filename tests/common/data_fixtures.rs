//! 测试数据生成模块

use agg_table_loader::agg::{AggConfigSpec, AggConfigs};
use agg_table_loader::search::{FieldColumn, FieldSpec, SortOrder, VisParams};
use serde_json::json;

pub const INDEX: &str = "logs-*";

/// 按时间倒序取原始行的表格参数
pub fn raw_rows_params(hits_size: u64) -> VisParams {
    VisParams {
        hits_size: Some(hits_size),
        field_columns: Some(vec![
            FieldColumn::new(FieldSpec::new("@timestamp").doc_values()),
            FieldColumn::new(FieldSpec::new("host")),
            FieldColumn::new(FieldSpec::new("size_kb").scripted("doc['bytes'].value / 1024")),
        ]),
        sort_field: Some(FieldSpec::new("@timestamp")),
        sort_order: SortOrder::Desc,
    }
}

/// 只要聚合结果的参数
pub fn aggregations_only_params() -> VisParams {
    VisParams::default()
}

/// 按主机分桶并计算平均字节数
pub fn host_bytes_aggs() -> AggConfigs {
    AggConfigs::from_specs(
        INDEX,
        vec![
            AggConfigSpec::new("2", "terms", "bucket")
                .with_param("field", json!("host"))
                .with_param("size", json!(10)),
            AggConfigSpec::new("3", "avg", "metric").with_param("field", json!("bytes")),
        ],
    )
}
