//! agg-table-loader - 表格可视化的数据加载
//!
//! 把聚合配置和显示参数转换为对搜索后端的分页请求，
//! 并把聚合产出的每个值包装为可回溯、可过滤、可格式化的结果节点。

pub mod agg;
pub mod config;
pub mod core;
pub mod format;
pub mod result;
pub mod search;
pub mod utils;

pub use crate::core::error::{LoadError, LoadResult};
