//! 统一错误处理 for agg-table-loader
//!
//! 错误分为三类：
//! - 前置条件违反：由类型系统保证或直接 panic，不在此处建模
//! - 后端请求失败：不重试，原样传播给调用方，进行中的分页加载随之中止
//! - 部分数据：不是错误，以 `total_hits == -1` 或行数不足的正常输出表示

use thiserror::Error;

/// 数据加载错误类型
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("后端错误: {0}")]
    Backend(String),

    #[error("HTTP错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("请求已取消")]
    Cancelled,

    #[error("配置错误: {0}")]
    Config(String),

    #[error("无效参数: {0}")]
    InvalidParams(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 统一的结果类型
pub type LoadResult<T> = Result<T, LoadError>;

impl From<toml::de::Error> for LoadError {
    fn from(err: toml::de::Error) -> Self {
        LoadError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LoadError {
    fn from(err: toml::ser::Error) -> Self {
        LoadError::Config(err.to_string())
    }
}

impl From<url::ParseError> for LoadError {
    fn from(err: url::ParseError) -> Self {
        LoadError::Config(format!("无效的URL: {}", err))
    }
}

impl LoadError {
    /// 后端请求错误
    pub fn backend(msg: impl Into<String>) -> Self {
        LoadError::Backend(msg.into())
    }

    /// 是否为取消导致的错误
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}
