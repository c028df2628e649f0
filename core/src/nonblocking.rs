//! Async adapter: the same operations as `SyncClient`, suspending the task
//! instead of the thread.
//!
//! # Design
//! `AsyncClient` shares `ChimuClient` with the blocking adapter, so URLs and
//! decoding cannot drift between the two. Each call owns its response for the
//! length of one exchange; dropping the returned future (for example when the
//! task is cancelled) drops the in-flight request with it.

use async_trait::async_trait;

use crate::client::ChimuClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Beatmap, BeatmapSet, SearchQuery, VerificationState};

/// Executes one HTTP exchange without blocking the executor.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl AsyncTransport for reqwest::Client {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.get(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Non-blocking chimu client.
#[derive(Debug, Clone)]
pub struct AsyncClient<T = reqwest::Client> {
    client: ChimuClient,
    transport: T,
}

impl AsyncClient {
    pub fn new() -> Self {
        Self::with_transport(ChimuClient::default(), reqwest::Client::new())
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_transport(
            ChimuClient::from_config(config),
            builder.build()?,
        ))
    }
}

impl Default for AsyncClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: AsyncTransport> AsyncClient<T> {
    pub fn with_transport(client: ChimuClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// `GET /map/{map_id}`
    pub async fn fetch_beatmap(&self, map_id: u32) -> Result<Beatmap> {
        let response = self.send(self.client.build_get_beatmap(map_id)).await?;
        self.client.parse_get_beatmap(response)
    }

    /// `GET /set/{set_id}`
    pub async fn fetch_beatmap_set(&self, set_id: u32) -> Result<BeatmapSet> {
        let response = self.send(self.client.build_get_beatmap_set(set_id)).await?;
        self.client.parse_get_beatmap_set(response)
    }

    /// `GET /search`, returning the service's `data` payload as-is.
    pub async fn search(&self, query: &SearchQuery) -> Result<serde_json::Value> {
        let response = self.send(self.client.build_search(query)).await?;
        self.client.parse_search(response)
    }

    /// Download a set archive behind the CAPTCHA-gated state.
    pub async fn download_file(&self, set_id: u32, key: &str) -> Result<Vec<u8>> {
        self.download_file_with_state(set_id, key, &VerificationState::default())
            .await
    }

    pub async fn download_file_with_state(
        &self,
        set_id: u32,
        key: &str,
        state: &VerificationState,
    ) -> Result<Vec<u8>> {
        let response = self
            .send(self.client.build_download(set_id, key, state))
            .await?;
        self.client.parse_download(set_id, response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending chimu request");
        let response = self.transport.execute(request).await?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received chimu response");
        Ok(response)
    }
}
