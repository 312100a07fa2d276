use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::LoadResult;

/// 单次后端请求允许的最大命中数
pub const MAX_HITS_SIZE: u64 = 10_000;

/// 应用根路径标记，用于计算 base path
pub const APP_ROOT_MARKER: &str = "/app/kibana";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub fetch: FetchConfig,
    pub format: FormatConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9200".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FetchConfig {
    pub max_hits_size: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_hits_size: MAX_HITS_SIZE,
        }
    }
}

/// 显示规范化策略
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    CommaDecimal,
    Passthrough,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FormatConfig {
    pub policy: PolicyKind,
    pub decimal_separator: char,
    pub currency_prefix: String,
    pub app_root_marker: String,
    pub origin: String,
    pub pathname: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::CommaDecimal,
            decimal_separator: ',',
            currency_prefix: "R$".to_string(),
            app_root_marker: APP_ROOT_MARKER.to_string(),
            origin: "http://localhost:5601".to_string(),
            pathname: "/app/kibana".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "table-fetch".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> LoadResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
