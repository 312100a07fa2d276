//! 模拟搜索后端
//!
//! 存储中有 `available` 条文档，第 i 条的排序值为 `[i]`，
//! 游标 `[i]` 表示从第 i+1 条开始返回

use agg_table_loader::search::{Hit, Hits, SearchBackend, SearchRequest, SearchResponse, TotalHits};
use agg_table_loader::{LoadError, LoadResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::time::Duration;

pub struct MockBackend {
    available: u64,
    total: Option<u64>,
    with_sort: bool,
    fail_on_call: Option<usize>,
    delay: Option<Duration>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockBackend {
    pub fn new(available: u64) -> Self {
        Self {
            available,
            total: Some(available),
            with_sort: true,
            fail_on_call: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_total(mut self, total: Option<u64>) -> Self {
        self.total = total;
        self
    }

    pub fn without_sort(mut self) -> Self {
        self.with_sort = false;
        self
    }

    /// 第 n 次调用（从 1 开始）返回错误
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().clone()
    }

    pub fn sizes(&self) -> Vec<u64> {
        self.requests.lock().iter().map(|r| r.size).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn search(&self, request: &SearchRequest) -> LoadResult<SearchResponse> {
        let call = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(LoadError::backend("模拟后端故障"));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let offset = request
            .search_after
            .as_ref()
            .and_then(|cursor| cursor.first())
            .and_then(Value::as_u64)
            .map(|last| last + 1)
            .unwrap_or(0);
        let count = request.size.min(self.available.saturating_sub(offset));
        let hits = (offset..offset + count)
            .map(|i| Hit {
                id: Some(format!("doc-{}", i)),
                source: Some(json!({ "host": format!("web-{}", i % 3) })),
                sort: if self.with_sort { vec![json!(i)] } else { Vec::new() },
                ..Hit::default()
            })
            .collect();

        Ok(SearchResponse {
            took: Some(1),
            timed_out: false,
            hits: Some(Hits {
                total: self.total.map(TotalHits::Count),
                hits,
            }),
            aggregations: Some(json!({ "2": { "buckets": [] } })),
        })
    }
}
