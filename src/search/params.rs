//! 可视化参数
//!
//! 表格可视化中与请求相关的显示参数

use serde::{Deserialize, Serialize};
use std::fmt;

/// 保留字段名，表示返回整个文档
pub const SOURCE_FIELD: &str = "_source";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub read_from_doc_values: bool,
    #[serde(default)]
    pub scripted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn doc_values(mut self) -> Self {
        self.read_from_doc_values = true;
        self
    }

    pub fn scripted(mut self, script: impl Into<String>) -> Self {
        self.scripted = true;
        self.script = Some(script.into());
        self
    }
}

/// 表格中的一列原始字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub field: FieldSpec,
}

impl FieldColumn {
    pub fn new(field: FieldSpec) -> Self {
        Self { label: None, field }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VisParams {
    /// 期望返回的总行数，缺省表示只要聚合结果
    #[serde(default)]
    pub hits_size: Option<u64>,
    #[serde(default)]
    pub field_columns: Option<Vec<FieldColumn>>,
    #[serde(default)]
    pub sort_field: Option<FieldSpec>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl VisParams {
    /// 是否需要返回行数据
    pub fn wants_rows(&self) -> bool {
        self.field_columns.is_some()
    }
}
