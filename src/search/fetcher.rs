//! 分页加载
//!
//! 把可视化参数转成一次或多次后端搜索：
//! - 单次请求的条数不超过上限
//! - 期望行数超过上限时用最后一行的排序值作为游标继续请求
//! - 汇总命中总数、聚合结果和累积的行
//!
//! 各页严格串行，每一页的游标依赖上一页的最后一行

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::backend::SearchBackend;
use super::inspector::{DataSnapshot, InspectorAdapters, ResponseStats};
use super::params::{FieldColumn, VisParams, SOURCE_FIELD};
use super::request::{build_query, RequestOptions, ScriptField, SearchRequest, SortClause, TimeRange};
use super::response::{Hit, SearchResponse};
use crate::agg::{AggConfigSpec, AggConfigs, AggDefinition, FilterExpression};
use crate::config::{FetchConfig, MAX_HITS_SIZE};
use crate::core::error::{LoadError, LoadResult};

/// 单次加载的上下文
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    pub time_range: Option<TimeRange>,
    pub query: Option<Value>,
    pub filters: Vec<FilterExpression>,
    pub options: RequestOptions,
    pub cancel: CancellationToken,
}

impl FetchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Initial,
    AwaitingPage,
    Accumulating,
    Done,
    Failed,
}

/// 推进分页后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    /// 继续请求，值为下一页大小
    Next(u64),
    /// 期望行数已取完
    Exhausted,
    /// 最后一行没有排序值，无法生成游标
    MissingSort,
}

/// 一次加载的分页状态，只在单次调用内存在
#[derive(Debug)]
pub struct FetchSession {
    requested_size: Option<u64>,
    hard_cap: u64,
    page_size: u64,
    remaining: u64,
    cursor: Option<Vec<Value>>,
    rows: Vec<Hit>,
    phase: FetchPhase,
    pages: usize,
}

impl FetchSession {
    pub fn new(requested_size: Option<u64>, hard_cap: u64) -> Self {
        Self {
            requested_size,
            hard_cap,
            page_size: requested_size.map(|n| n.min(hard_cap)).unwrap_or(0),
            remaining: requested_size.unwrap_or(0),
            cursor: None,
            rows: Vec::new(),
            phase: FetchPhase::Initial,
            pages: 0,
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn cursor(&self) -> Option<&[Value]> {
        self.cursor.as_deref()
    }

    pub fn rows(&self) -> &[Hit] {
        &self.rows
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// 期望行数是否超过单次请求上限
    pub fn exceeds_cap(&self) -> bool {
        self.requested_size.is_some_and(|n| n > self.hard_cap)
    }

    pub fn needs_continuation(&self, total_hits: i64) -> bool {
        self.exceeds_cap() && total_hits > self.hard_cap as i64
    }

    /// 扣减刚取完的一页，以最后一行的排序值作为游标
    pub fn advance(&mut self) -> PageStep {
        self.remaining = self.remaining.saturating_sub(self.page_size);
        let next = self.remaining.min(self.hard_cap);
        if next == 0 {
            return PageStep::Exhausted;
        }
        let Some(cursor) = self
            .rows
            .last()
            .map(|hit| hit.sort.clone())
            .filter(|sort| !sort.is_empty())
        else {
            return PageStep::MissingSort;
        };
        self.page_size = next;
        self.cursor = Some(cursor);
        PageStep::Next(next)
    }

    /// 剩余行数已不超过刚请求的页大小
    pub fn is_complete(&self) -> bool {
        self.remaining <= self.page_size
    }

    pub fn accumulate(&mut self, rows: Vec<Hit>) {
        self.rows.extend(rows);
    }

    fn set_phase(&mut self, phase: FetchPhase) {
        log::trace!("分页状态: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn take_rows(&mut self) -> Vec<Hit> {
        std::mem::take(&mut self.rows)
    }
}

/// 加载结果
#[derive(Debug, Clone)]
pub struct TableResponse {
    pub aggregations: Option<Value>,
    /// 命中总数，后端未提供时为 -1
    pub total_hits: i64,
    pub aggs: AggConfigs,
    pub hits: Option<Vec<Hit>>,
    pub field_columns: Option<Vec<FieldColumn>>,
}

impl TableResponse {
    pub fn to_json(&self) -> Value {
        let aggs: Vec<Value> = self
            .aggs
            .iter()
            .map(|agg| json!({ "id": agg.id(), "type": agg.type_name(), "schema": agg.schema() }))
            .collect();
        json!({
            "total_hits": self.total_hits,
            "aggs": aggs,
            "aggregations": self.aggregations,
            "hits": self.hits,
            "field_columns": self.field_columns,
        })
    }
}

pub struct PaginatedFetcher {
    backend: Arc<dyn SearchBackend>,
    hard_cap: u64,
}

impl PaginatedFetcher {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &FetchConfig) -> Self {
        Self {
            backend,
            hard_cap: config.max_hits_size,
        }
    }

    pub fn with_default_cap(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            hard_cap: MAX_HITS_SIZE,
        }
    }

    pub fn hard_cap(&self) -> u64 {
        self.hard_cap
    }

    /// 聚合树为空时补一个计数指标
    pub fn ensure_default_metric(aggs: &mut AggConfigs) {
        if aggs.is_empty() {
            aggs.create_agg_config(AggConfigSpec::default_count());
            log::debug!("聚合树为空，已补充 count 指标");
        }
    }

    /// 构造第一页请求
    pub fn build_request(
        &self,
        aggs: &AggConfigs,
        params: &VisParams,
        ctx: &FetchContext,
    ) -> SearchRequest {
        let mut request = SearchRequest::new(aggs.index_pattern());
        request.options = ctx.options;
        request.size = params
            .hits_size
            .map(|n| n.min(self.hard_cap))
            .unwrap_or(0);

        if let Some(columns) = &params.field_columns {
            if !columns.iter().any(|c| c.field.name == SOURCE_FIELD) {
                request.source = Some(columns.iter().map(|c| c.field.name.clone()).collect());
            }
            request.docvalue_fields = Some(
                columns
                    .iter()
                    .filter(|c| c.field.read_from_doc_values)
                    .map(|c| c.field.name.clone())
                    .collect(),
            );
            let scripts: BTreeMap<String, ScriptField> = columns
                .iter()
                .filter(|c| c.field.scripted)
                .map(|c| {
                    (
                        c.field.name.clone(),
                        ScriptField::new(c.field.script.clone().unwrap_or_default()),
                    )
                })
                .collect();
            request.script_fields = Some(scripts);
        }

        if let Some(sort_field) = &params.sort_field {
            request.sort.push(SortClause::Field {
                field: sort_field.name.clone(),
                order: params.sort_order,
            });
            if params.hits_size.is_some_and(|n| n > self.hard_cap) {
                request.sort.push(SortClause::Doc);
            }
        }

        request.query = build_query(ctx.query.as_ref(), ctx.time_range.as_ref(), &ctx.filters);
        request.aggs = aggs.to_dsl(ctx.options.metrics_at_all_levels);
        request
    }

    /// 执行加载
    ///
    /// 后端失败或被取消时直接返回错误，已累积的行随会话丢弃
    pub async fn fetch(
        &self,
        aggs: &mut AggConfigs,
        params: &VisParams,
        ctx: &FetchContext,
        inspector: &mut InspectorAdapters,
    ) -> LoadResult<TableResponse> {
        *inspector = InspectorAdapters::new();
        Self::ensure_default_metric(aggs);

        let mut session = FetchSession::new(params.hits_size, self.hard_cap);
        let mut request = self.build_request(aggs, params, ctx);

        let mut first = self.execute_page(&mut session, &request, ctx, inspector).await?;
        let total_hits = first.total_hits();
        let aggregations = first.aggregations.take();

        let mut response = TableResponse {
            aggregations,
            total_hits,
            aggs: aggs.clone(),
            hits: None,
            field_columns: None,
        };

        if let Some(columns) = &params.field_columns {
            session.accumulate(first.into_hits());
            if session.needs_continuation(total_hits) {
                self.fetch_remaining(&mut session, &mut request, ctx, inspector)
                    .await?;
            }
            response.field_columns = Some(columns.clone());
            response.hits = Some(session.take_rows());
        }

        session.set_phase(FetchPhase::Done);
        inspector.data.set_snapshot(DataSnapshot {
            total_hits,
            row_count: response.hits.as_ref().map(Vec::len).unwrap_or(0),
            columns: params
                .field_columns
                .iter()
                .flatten()
                .map(|c| c.field.name.clone())
                .collect(),
            aggregations: response.aggregations.clone(),
        });
        log::info!(
            "加载完成: index={} total_hits={} rows={} pages={}",
            aggs.index_pattern(),
            total_hits,
            response.hits.as_ref().map(Vec::len).unwrap_or(0),
            session.pages()
        );
        Ok(response)
    }

    async fn fetch_remaining(
        &self,
        session: &mut FetchSession,
        request: &mut SearchRequest,
        ctx: &FetchContext,
        inspector: &InspectorAdapters,
    ) -> LoadResult<()> {
        loop {
            let size = match session.advance() {
                PageStep::Next(size) => size,
                PageStep::Exhausted => {
                    log::debug!("期望行数已取完, 共 {} 行", session.rows().len());
                    break;
                }
                PageStep::MissingSort => {
                    log::warn!(
                        "无法继续分页: 最后一行没有排序值, 已累积 {} 行",
                        session.rows().len()
                    );
                    break;
                }
            };
            request.size = size;
            request.search_after = session.cursor().map(<[Value]>::to_vec);

            let page = self.execute_page(session, request, ctx, inspector).await?;
            let returned = page.hit_count() as u64;
            session.accumulate(page.into_hits());

            if returned < size {
                log::debug!("后端数据已耗尽: 请求 {} 行, 返回 {} 行", size, returned);
                break;
            }
            if session.is_complete() {
                break;
            }
        }
        Ok(())
    }

    async fn execute_page(
        &self,
        session: &mut FetchSession,
        request: &SearchRequest,
        ctx: &FetchContext,
        inspector: &InspectorAdapters,
    ) -> LoadResult<SearchResponse> {
        if ctx.cancel.is_cancelled() {
            session.set_phase(FetchPhase::Failed);
            return Err(LoadError::Cancelled);
        }

        session.set_phase(FetchPhase::AwaitingPage);
        let record = inspector
            .requests
            .start(format!("page {}", session.pages() + 1), request.to_body()?);
        log::debug!(
            "请求第 {} 页: index={} size={} search_after={:?}",
            session.pages() + 1,
            request.index,
            request.size,
            request.search_after
        );

        let result = tokio::select! {
            _ = ctx.cancel.cancelled() => Err(LoadError::Cancelled),
            result = self.backend.search(request) => result,
        };

        match result {
            Ok(response) => {
                inspector.requests.finish_ok(
                    record,
                    ResponseStats {
                        total_hits: response.total_hits(),
                        hits_returned: response.hit_count(),
                        took_ms: response.took,
                    },
                );
                session.pages += 1;
                session.set_phase(FetchPhase::Accumulating);
                Ok(response)
            }
            Err(e) => {
                inspector.requests.finish_error(record, e.to_string());
                session.set_phase(FetchPhase::Failed);
                log::warn!("第 {} 页请求失败: {}", session.pages() + 1, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::params::FieldSpec;
    use crate::search::params::SortOrder;
    use async_trait::async_trait;

    struct NullBackend;

    #[async_trait]
    impl SearchBackend for NullBackend {
        async fn search(&self, _request: &SearchRequest) -> LoadResult<SearchResponse> {
            Ok(SearchResponse::default())
        }
    }

    fn fetcher() -> PaginatedFetcher {
        PaginatedFetcher::with_default_cap(Arc::new(NullBackend))
    }

    fn hit(sort: i64) -> Hit {
        Hit {
            sort: vec![json!(sort)],
            ..Hit::default()
        }
    }

    #[test]
    fn test_session_first_page_size() {
        assert_eq!(FetchSession::new(None, 10_000).page_size(), 0);
        assert_eq!(FetchSession::new(Some(50), 10_000).page_size(), 50);
        assert_eq!(FetchSession::new(Some(25_000), 10_000).page_size(), 10_000);
    }

    #[test]
    fn test_session_advance_sequence() {
        let mut session = FetchSession::new(Some(25_000), 10_000);
        session.accumulate(vec![hit(1)]);
        assert_eq!(session.advance(), PageStep::Next(10_000));
        assert_eq!(session.cursor(), Some(&[json!(1)][..]));
        assert!(!session.is_complete());

        session.accumulate(vec![hit(2)]);
        assert_eq!(session.advance(), PageStep::Next(5_000));
        assert_eq!(session.cursor(), Some(&[json!(2)][..]));
        assert!(session.is_complete());
    }

    #[test]
    fn test_session_advance_without_sort() {
        let mut session = FetchSession::new(Some(25_000), 10_000);
        session.accumulate(vec![Hit::default()]);
        assert_eq!(session.advance(), PageStep::MissingSort);
        assert!(session.cursor().is_none());
    }

    #[test]
    fn test_session_advance_exhausted() {
        let mut session = FetchSession::new(Some(10_000), 10_000);
        session.accumulate(vec![hit(1)]);
        assert_eq!(session.advance(), PageStep::Exhausted);

        let mut session = FetchSession::new(Some(20_000), 10_000);
        session.accumulate(vec![Hit::default()]);
        assert_eq!(session.advance(), PageStep::MissingSort);
    }

    #[test]
    fn test_needs_continuation() {
        let session = FetchSession::new(Some(25_000), 10_000);
        assert!(session.needs_continuation(30_000));
        assert!(!session.needs_continuation(10_000));
        assert!(!session.needs_continuation(-1));
        assert!(!FetchSession::new(Some(10_000), 10_000).needs_continuation(30_000));
    }

    #[test]
    fn test_build_request_aggregations_only() {
        let mut aggs = AggConfigs::new("logs-*");
        PaginatedFetcher::ensure_default_metric(&mut aggs);
        let request = fetcher().build_request(&aggs, &VisParams::default(), &FetchContext::new());
        assert_eq!(request.size, 0);
        assert!(request.source.is_none());
        assert!(request.sort.is_empty());
        assert_eq!(request.index, "logs-*");
    }

    #[test]
    fn test_build_request_field_columns() {
        let aggs = AggConfigs::new("logs-*");
        let params = VisParams {
            hits_size: Some(100),
            field_columns: Some(vec![
                FieldColumn::new(FieldSpec::new("host").doc_values()),
                FieldColumn::new(FieldSpec::new("kb").scripted("doc['bytes'].value / 1024")),
            ]),
            ..VisParams::default()
        };
        let request = fetcher().build_request(&aggs, &params, &FetchContext::new());
        assert_eq!(request.size, 100);
        assert_eq!(request.source, Some(vec!["host".to_string(), "kb".to_string()]));
        assert_eq!(request.docvalue_fields, Some(vec!["host".to_string()]));
        let scripts = request.script_fields.expect("应该有脚本字段");
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts["kb"].script.source, "doc['bytes'].value / 1024");
    }

    #[test]
    fn test_build_request_source_marker_disables_projection() {
        let aggs = AggConfigs::new("logs-*");
        let params = VisParams {
            hits_size: Some(10),
            field_columns: Some(vec![
                FieldColumn::new(FieldSpec::new("host")),
                FieldColumn::new(FieldSpec::new(SOURCE_FIELD)),
            ]),
            ..VisParams::default()
        };
        let request = fetcher().build_request(&aggs, &params, &FetchContext::new());
        assert!(request.source.is_none());
        assert_eq!(request.script_fields.map(|s| s.len()), Some(0));
    }

    #[test]
    fn test_build_request_sort_tie_break() {
        let aggs = AggConfigs::new("logs-*");
        let mut params = VisParams {
            hits_size: Some(5_000),
            sort_field: Some(FieldSpec::new("@timestamp")),
            sort_order: SortOrder::Desc,
            ..VisParams::default()
        };
        let request = fetcher().build_request(&aggs, &params, &FetchContext::new());
        assert_eq!(request.sort.len(), 1);

        params.hits_size = Some(25_000);
        let request = fetcher().build_request(&aggs, &params, &FetchContext::new());
        assert_eq!(request.size, 10_000);
        assert_eq!(
            request.sort,
            vec![
                SortClause::Field {
                    field: "@timestamp".to_string(),
                    order: SortOrder::Desc
                },
                SortClause::Doc
            ]
        );
    }
}
