//! 检查器适配器
//!
//! 加载过程向两个只写槽位记录请求/响应信息，供外部调试工具读取

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStats {
    pub total_hits: i64,
    pub hits_returned: usize,
    pub took_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub name: String,
    pub request: Value,
    pub status: RequestStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub stats: Option<ResponseStats>,
    pub error: Option<String>,
}

/// 请求记录
#[derive(Debug, Default)]
pub struct RequestAdapter {
    records: Mutex<Vec<RequestRecord>>,
}

impl RequestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次开始的请求，返回其ID
    pub fn start(&self, name: impl Into<String>, request: Value) -> Uuid {
        let id = Uuid::new_v4();
        self.records.lock().push(RequestRecord {
            id,
            name: name.into(),
            request,
            status: RequestStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            stats: None,
            error: None,
        });
        id
    }

    pub fn finish_ok(&self, id: Uuid, stats: ResponseStats) {
        self.update(id, |record| {
            record.status = RequestStatus::Ok;
            record.stats = Some(stats);
        });
    }

    pub fn finish_error(&self, id: Uuid, message: impl Into<String>) {
        let message = message.into();
        self.update(id, |record| {
            record.status = RequestStatus::Error;
            record.error = Some(message);
        });
    }

    fn update<F: FnOnce(&mut RequestRecord)>(&self, id: Uuid, f: F) {
        let mut records = self.records.lock();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            f(record);
            record.completed_at = Some(Utc::now());
        }
    }

    pub fn records(&self) -> Vec<RequestRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// 最终表格数据的快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    pub total_hits: i64,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub aggregations: Option<Value>,
}

#[derive(Debug, Default)]
pub struct DataAdapter {
    snapshot: Mutex<Option<DataSnapshot>>,
}

impl DataAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_snapshot(&self, snapshot: DataSnapshot) {
        *self.snapshot.lock() = Some(snapshot);
    }

    pub fn snapshot(&self) -> Option<DataSnapshot> {
        self.snapshot.lock().clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InspectorAdapters {
    pub requests: Arc<RequestAdapter>,
    pub data: Arc<DataAdapter>,
}

impl InspectorAdapters {
    pub fn new() -> Self {
        Self::default()
    }
}
