//! 搜索后端
//!
//! `SearchBackend` 是分页加载依赖的唯一传输接口，
//! `HttpSearchBackend` 通过 HTTP `_search` 端点实现

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::request::SearchRequest;
use super::response::SearchResponse;
use crate::config::BackendConfig;
use crate::core::error::{LoadError, LoadResult};

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// 执行一次搜索，失败原样返回，不做重试
    async fn search(&self, request: &SearchRequest) -> LoadResult<SearchResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    client: Client,
    base_url: Url,
}

impl HttpSearchBackend {
    pub fn new(config: &BackendConfig) -> LoadResult<Self> {
        let mut base_url = Url::parse(&config.url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// `<base>/<index>/_search`
    pub fn endpoint(&self, request: &SearchRequest) -> LoadResult<Url> {
        if request.index.is_empty() {
            return Err(LoadError::InvalidParams("请求缺少索引".to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LoadError::Config(format!("后端地址不能作为基础路径: {}", self.base_url)))?
            .pop_if_empty()
            .push(&request.index)
            .push("_search");
        if request.options.force_fetch {
            url.query_pairs_mut().append_pair("request_cache", "false");
        }
        Ok(url)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, request: &SearchRequest) -> LoadResult<SearchResponse> {
        let url = self.endpoint(request)?;
        let body = request.to_body()?;
        log::debug!("POST {} size={}", url, request.size);

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LoadError::backend(format!("{}: {}", status, text)));
        }
        Ok(response.json::<SearchResponse>().await?)
    }
}
