//! 聚合结果模块
//!
//! 将聚合树产出的每个值包装为统一的结果节点，供渲染层使用

pub mod node;

pub use node::{ResultKind, ResultNode};
