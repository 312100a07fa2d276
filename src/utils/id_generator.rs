//! ID生成器模块
//!
//! 为聚合定义分配进程内唯一的身份标识，格式化缓存以此作为键

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// ID生成器
#[derive(Debug)]
pub struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    /// 创建新的ID生成器，使用指定的初始值
    pub fn new(init: u64) -> Self {
        Self {
            counter: AtomicU64::new(init),
        }
    }

    /// 生成下一个ID
    pub fn id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    /// 获取当前计数值
    pub fn current_value(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

/// 聚合定义身份生成器 - 单例
pub fn agg_identity_generator() -> &'static IdGenerator {
    static INSTANCE: OnceLock<IdGenerator> = OnceLock::new();
    INSTANCE.get_or_init(|| IdGenerator::new(1))
}
