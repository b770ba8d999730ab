use crate::error::Result;
use crate::error::SearchError;
use crate::proto::SearchRequest;
use crate::proto::SearchResponse;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// The hosted full-text search service. Ranking is entirely server-side.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse>;
}

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpSearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpSearchClient {
    pub fn new(opts: ClientOptions) -> Result<Self> {
        if opts.endpoint.trim().is_empty() {
            return Err(SearchError::NotConfigured);
        }
        let http = reqwest::Client::builder()
            .timeout(opts.timeout)
            .build()
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: opts.endpoint,
            api_token: opts.api_token,
            timeout: opts.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|err| SearchError::Transport(format!("invalid api token: {err}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn map_error(&self, err: reqwest::Error) -> SearchError {
        if err.is_timeout() {
            SearchError::Timeout(self.timeout)
        } else {
            SearchError::from(err)
        }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let resp = self
            .http
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|err| self.map_error(err))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }
        resp.json::<SearchResponse>()
            .await
            .map_err(|err| self.map_error(err))
    }
}
