//! 结果节点
//!
//! 表示聚合结果树中的一个值：
//! - 沿父节点回溯得到从根到自身的路径
//! - 派生出等价于“这一切片”的过滤条件
//! - 经缓存的格式化器生成显示字符串
//!
//! 节点只持有父节点的弱引用，树的生命周期由持有根节点的一方控制

use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::agg::{AggDefinition, AggKind, FilterExpression};
use crate::format::{ContentType, FormatterCache};

/// 节点类别，构造时确定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Bucket,
    Metric,
}

impl From<AggKind> for ResultKind {
    fn from(kind: AggKind) -> Self {
        match kind {
            AggKind::Buckets => ResultKind::Bucket,
            AggKind::Metrics => ResultKind::Metric,
        }
    }
}

pub struct ResultNode {
    key: Value,
    value: Value,
    agg: Arc<dyn AggDefinition>,
    parent: Option<Weak<ResultNode>>,
    filters: Option<FilterExpression>,
    kind: ResultKind,
}

impl ResultNode {
    pub fn new(
        agg: Arc<dyn AggDefinition>,
        parent: Option<&Arc<ResultNode>>,
        value: Value,
        key: Value,
        filters: Option<FilterExpression>,
    ) -> Arc<Self> {
        let kind = ResultKind::from(agg.kind());
        Arc::new(Self {
            key,
            value,
            agg,
            parent: parent.map(Arc::downgrade),
            filters,
            kind,
        })
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn agg(&self) -> &Arc<dyn AggDefinition> {
        &self.agg
    }

    pub fn explicit_filters(&self) -> Option<&FilterExpression> {
        self.filters.as_ref()
    }

    /// 父节点，父节点已被释放时返回 None
    pub fn parent(&self) -> Option<Arc<ResultNode>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// 从根到自身的节点序列
    pub fn ancestry_path(self: &Arc<Self>) -> Vec<Arc<ResultNode>> {
        let mut path = vec![Arc::clone(self)];
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            path.push(node);
        }
        path.reverse();
        path
    }

    /// 显式过滤条件优先，否则由聚合定义根据 key 派生
    pub fn create_filter(&self) -> Option<FilterExpression> {
        match &self.filters {
            Some(filters) => Some(filters.clone()),
            None => self.agg.create_filter(&self.key),
        }
    }

    /// 生成显示字符串，`content_type` 缺省为 text
    pub fn to_display_string(
        &self,
        cache: &FormatterCache,
        content_type: Option<ContentType>,
    ) -> String {
        cache.format(
            self.agg.as_ref(),
            &self.value,
            content_type.unwrap_or_default(),
        )
    }

    /// 原始值
    pub fn value_of(&self) -> &Value {
        &self.value
    }
}

impl PartialEq<Value> for ResultNode {
    fn eq(&self, other: &Value) -> bool {
        &self.value == other
    }
}

impl fmt::Debug for ResultNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultNode")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("agg", &self.agg.id())
            .field("kind", &self.kind)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
