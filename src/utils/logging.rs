//! 加载器日志
//!
//! 库代码只使用 `log` 宏，二进制入口在启动时调用 [`init`]，退出前调用 [`shutdown`]

use crate::config::LogConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::sync::Mutex;

static HANDLE: Mutex<Option<LoggerHandle>> = Mutex::new(None);

fn file_spec(config: &LogConfig) -> FileSpec {
    FileSpec::default()
        .basename(&config.file)
        .directory(&config.dir)
}

/// 按 `LogConfig` 启动文件日志
///
/// 超过 `max_file_size` 轮转，最多保留 `max_files` 个旧文件；重复调用会替换之前的句柄
///
/// ```no_run
/// use agg_table_loader::config::Config;
/// use agg_table_loader::utils::logging;
///
/// let config = Config::default();
/// logging::init(&config.log).expect("日志初始化失败");
/// ```
pub fn init(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let handle = Logger::try_with_str(&config.level)?
        .log_to_file(file_spec(config))
        .rotate(
            Criterion::Size(config.max_file_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .write_mode(WriteMode::Async)
        .append()
        .start()?;

    if let Ok(mut slot) = HANDLE.lock() {
        if let Some(previous) = slot.replace(handle) {
            previous.flush();
        }
    }

    log::info!(
        "table-fetch 日志已启动: level={} path={}/{}",
        config.level,
        config.dir,
        config.file
    );
    Ok(())
}

/// 写出缓冲中的日志并释放句柄
pub fn shutdown() {
    let handle = HANDLE.lock().ok().and_then(|mut slot| slot.take());
    if let Some(handle) = handle {
        handle.flush();
    }
}

pub fn is_initialized() -> bool {
    HANDLE.lock().map(|slot| slot.is_some()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn log_config(dir: &tempfile::TempDir) -> LogConfig {
        LogConfig {
            dir: dir.path().to_string_lossy().into_owned(),
            level: "debug".to_string(),
            ..LogConfig::default()
        }
    }

    #[test]
    #[serial]
    fn test_init_then_shutdown_releases_handle() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");

        let result = init(&log_config(&dir));
        assert!(result.is_ok(), "日志初始化失败: {:?}", result.err());
        assert!(is_initialized());

        log::debug!("分页加载日志");

        shutdown();
        assert!(!is_initialized());
        shutdown();
    }

    #[test]
    #[serial]
    fn test_invalid_level_is_rejected() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let config = LogConfig {
            level: "no-such-level=???".to_string(),
            ..log_config(&dir)
        };
        assert!(init(&config).is_err());
        assert!(!is_initialized());
    }
}