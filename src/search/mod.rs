//! 搜索请求模块
//!
//! 提供从可视化参数到后端搜索的完整链路：
//! - 请求/响应模型
//! - 后端接口及 HTTP 实现
//! - 检查器适配器
//! - 分页加载

pub mod backend;
pub mod fetcher;
pub mod inspector;
pub mod params;
pub mod request;
pub mod response;

pub use backend::{HttpSearchBackend, SearchBackend};
pub use fetcher::{
    FetchContext, FetchPhase, FetchSession, PageStep, PaginatedFetcher, TableResponse,
};
pub use inspector::{
    DataAdapter, DataSnapshot, InspectorAdapters, RequestAdapter, RequestRecord, RequestStatus,
    ResponseStats,
};
pub use params::{FieldColumn, FieldSpec, SortOrder, VisParams, SOURCE_FIELD};
pub use request::{build_query, RequestOptions, ScriptField, SearchRequest, SortClause, TimeRange};
pub use response::{Hit, Hits, SearchResponse, TotalHits};
