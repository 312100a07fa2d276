//! 自定义断言辅助模块

use agg_table_loader::search::SearchRequest;

/// 断言结果成功，返回内部值
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
    result.expect("操作应该成功")
}

/// 断言结果失败并匹配错误消息
pub fn assert_err_with<T: std::fmt::Debug, E: std::fmt::Display>(result: Result<T, E>, expected_msg: &str) {
    let err = result.expect_err("操作应该失败");
    let err_str = err.to_string();
    assert!(
        err_str.contains(expected_msg),
        "错误消息应包含 '{}', 实际是 '{}'",
        expected_msg,
        err_str
    );
}

/// 断言集合包含指定数量的元素
pub fn assert_count<T>(collection: &[T], expected: usize, item_name: &str) {
    assert_eq!(
        collection.len(),
        expected,
        "{}数量不匹配: 期望 {}, 实际 {}",
        item_name,
        expected,
        collection.len()
    );
}

/// 断言每个请求的条数都不超过上限
pub fn assert_within_cap(requests: &[SearchRequest], hard_cap: u64) {
    for (i, request) in requests.iter().enumerate() {
        assert!(
            request.size <= hard_cap,
            "第 {} 个请求条数 {} 超过上限 {}",
            i + 1,
            request.size,
            hard_cap
        );
    }
}
