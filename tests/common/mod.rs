//! 集成测试共享工具模块
//!
//! 提供模拟后端、测试数据和断言辅助函数

#![allow(dead_code)]

pub mod assertions;
pub mod data_fixtures;
pub mod mock_backend;

pub use mock_backend::MockBackend;
