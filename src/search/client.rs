use async_trait::async_trait;
use crate::core::shelf::{ShelfError, ShelfResult};
use crate::search::model::{parse_search_body, SearchResponse};

#[async_trait]
pub trait SearchApi: Sync + Send {
    async fn search(&self, query: &str, limit: usize, offset: usize) -> ShelfResult<SearchResponse>;
}

// One GET per search, no retry and no caching; timeouts are whatever the
// underlying client defaults to.
pub struct HttpSearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSearchClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchApi for HttpSearchClient {
    async fn search(&self, query: &str, limit: usize, offset: usize) -> ShelfResult<SearchResponse> {
        let url = format!("{}/search.json", self.base_url);
        let res = self.client
            .get(url.as_str())
            .query(&[("q", query),
                ("limit", limit.to_string().as_str()),
                ("offset", offset.to_string().as_str())])
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ShelfError::network(
                format!("search endpoint returned {} for {}", status, query).as_str(),
                Some(status.as_u16().to_string()),
                status.is_server_error()));
        }
        let body = res.text().await?;
        parse_search_body(body.as_str())
    }
}
