//! 格式化器缓存模块
//!
//! 以聚合定义身份为键缓存格式化函数和格式化选项：
//! - 同一聚合定义、同一内容类型的格式化器只构造一次
//! - 格式化选项每个聚合定义只计算一次
//! - 首个写入者生效，后续并发构造得到等价值
//! - 缓存统计

use dashmap::DashMap;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{
    policy_from_config, ContentType, DisplayPolicy, Formatter, FormatterOptions, PageLocation,
};
use crate::agg::{AggDefinition, AggIdentity};
use crate::config::FormatConfig;

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub insertions: AtomicU64,
    pub invalidations: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insertion(&self) {
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub invalidations: u64,
    pub hit_rate: f64,
    pub cache_size: usize,
}

pub struct FormatterCache {
    formatters: DashMap<(AggIdentity, ContentType), Formatter>,
    options: DashMap<AggIdentity, Arc<FormatterOptions>>,
    location: PageLocation,
    app_root_marker: String,
    policy: Arc<dyn DisplayPolicy>,
    stats: CacheStats,
}

impl FormatterCache {
    pub fn new(
        location: PageLocation,
        app_root_marker: impl Into<String>,
        policy: Arc<dyn DisplayPolicy>,
    ) -> Self {
        Self {
            formatters: DashMap::new(),
            options: DashMap::new(),
            location,
            app_root_marker: app_root_marker.into(),
            policy,
            stats: CacheStats::default(),
        }
    }

    pub fn from_config(config: &FormatConfig) -> Self {
        Self::new(
            PageLocation::new(config.origin.clone(), config.pathname.clone()),
            config.app_root_marker.clone(),
            policy_from_config(config),
        )
    }

    /// 获取或构造聚合定义在指定内容类型下的格式化器
    pub fn formatter(&self, agg: &dyn AggDefinition, content_type: ContentType) -> Formatter {
        let key = (agg.identity(), content_type);
        if let Some(formatter) = self.formatters.get(&key) {
            self.stats.record_hit();
            return formatter.value().clone();
        }

        self.stats.record_miss();
        self.formatters
            .entry(key)
            .or_insert_with(|| {
                self.stats.record_insertion();
                log::debug!(
                    "构造格式化器: agg={} content_type={}",
                    agg.id(),
                    content_type
                );
                agg.field_formatter(content_type)
            })
            .value()
            .clone()
    }

    /// 获取或计算聚合定义的格式化选项
    pub fn options(&self, agg: &dyn AggDefinition) -> Arc<FormatterOptions> {
        self.options
            .entry(agg.identity())
            .or_insert_with(|| {
                Arc::new(FormatterOptions::from_location(
                    &self.location,
                    &self.app_root_marker,
                ))
            })
            .value()
            .clone()
    }

    /// 格式化并应用显示规范化
    pub fn format(&self, agg: &dyn AggDefinition, value: &Value, content_type: ContentType) -> String {
        let formatter = self.formatter(agg, content_type);
        let options = self.options(agg);
        self.policy.normalize(formatter(value, &options))
    }

    /// 移除某个聚合定义的全部缓存项
    pub fn invalidate(&self, identity: AggIdentity) {
        self.formatters.retain(|(id, _), _| *id != identity);
        self.options.remove(&identity);
        self.stats.record_invalidation();
    }

    pub fn contains(&self, identity: AggIdentity, content_type: ContentType) -> bool {
        self.formatters.contains_key(&(identity, content_type))
    }

    pub fn policy(&self) -> &dyn DisplayPolicy {
        self.policy.as_ref()
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            insertions: self.stats.insertions.load(Ordering::Relaxed),
            invalidations: self.stats.invalidations.load(Ordering::Relaxed),
            hit_rate: self.stats.hit_rate(),
            cache_size: self.formatters.len(),
        }
    }
}

impl Default for FormatterCache {
    fn default() -> Self {
        Self::from_config(&FormatConfig::default())
    }
}

impl fmt::Debug for FormatterCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterCache")
            .field("location", &self.location)
            .field("app_root_marker", &self.app_root_marker)
            .field("policy", &self.policy)
            .field("formatters", &self.formatters.len())
            .field("options", &self.options.len())
            .finish()
    }
}
