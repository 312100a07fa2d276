//! 显示规范化策略
//!
//! 在通用字段格式化器的输出上叠加的地区性显示约定

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::{FormatConfig, PolicyKind};

/// 格式化结果的后处理策略
pub trait DisplayPolicy: Send + Sync + Debug {
    fn normalize(&self, formatted: String) -> String;
}

/// 不做任何处理
#[derive(Debug, Default, Clone)]
pub struct PassthroughPolicy;

impl DisplayPolicy for PassthroughPolicy {
    fn normalize(&self, formatted: String) -> String {
        formatted
    }
}

/// 逗号小数约定
///
/// - 非货币值的小数部分为零时去掉小数部分：`1,00` -> `1`
/// - 货币值没有小数分隔符时补齐两位：`R$1` -> `R$1,00`
#[derive(Debug, Clone)]
pub struct CommaDecimalPolicy {
    pub separator: char,
    pub currency_prefix: String,
}

impl Default for CommaDecimalPolicy {
    fn default() -> Self {
        Self {
            separator: ',',
            currency_prefix: "R$".to_string(),
        }
    }
}

impl CommaDecimalPolicy {
    pub fn new(separator: char, currency_prefix: impl Into<String>) -> Self {
        Self {
            separator,
            currency_prefix: currency_prefix.into(),
        }
    }

    fn is_currency(&self, s: &str) -> bool {
        !self.currency_prefix.is_empty() && s.starts_with(&self.currency_prefix)
    }
}

/// 小数段非空且数值为零，只含空白的小数段按零处理
fn is_zero_fraction(fraction: &str) -> bool {
    if fraction.is_empty() {
        return false;
    }
    let trimmed = fraction.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().map(|n| n == 0.0).unwrap_or(false)
}

impl DisplayPolicy for CommaDecimalPolicy {
    fn normalize(&self, formatted: String) -> String {
        let mut v = formatted;

        // 只看第一个分隔符后的那一段
        let mut parts = v.split(self.separator);
        let integer = parts.next().unwrap_or_default();
        let fraction = parts.next();

        if let Some(fraction) = fraction {
            if is_zero_fraction(fraction) && !self.is_currency(&v) {
                v = integer.to_string();
            }
        }

        if !v.contains(self.separator) && self.is_currency(&v) {
            v.push(self.separator);
            v.push_str("00");
        }
        v
    }
}

/// 根据配置构造显示策略
pub fn policy_from_config(config: &FormatConfig) -> Arc<dyn DisplayPolicy> {
    match config.policy {
        PolicyKind::CommaDecimal => Arc::new(CommaDecimalPolicy::new(
            config.decimal_separator,
            config.currency_prefix.clone(),
        )),
        PolicyKind::Passthrough => Arc::new(PassthroughPolicy),
    }
}
