//! Blocking adapter: runs `ChimuClient` requests on the calling thread.
//!
//! # Design
//! `SyncClient` owns a `ChimuClient` and a `Transport`. Each operation is
//! build, execute, parse, with no state kept between calls. The default
//! transport is a `ureq::Agent` configured to hand back non-2xx statuses as
//! data, so status interpretation stays in the core.

use std::io::Read;

use crate::client::ChimuClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Beatmap, BeatmapSet, SearchQuery, VerificationState};

/// Executes one HTTP exchange to completion on the calling thread.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

impl Transport for ureq::Agent {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.get(request.url.as_str()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call()?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        // as_reader has no size cap; archives routinely exceed ureq's default.
        let mut body = Vec::new();
        response.body_mut().as_reader().read_to_end(&mut body)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Blocking chimu client.
#[derive(Debug, Clone)]
pub struct SyncClient<T = ureq::Agent> {
    client: ChimuClient,
    transport: T,
}

impl SyncClient {
    pub fn new() -> Self {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self::with_transport(ChimuClient::from_config(config), agent)
    }
}

impl Default for SyncClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> SyncClient<T> {
    pub fn with_transport(client: ChimuClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// `GET /map/{map_id}`
    pub fn fetch_beatmap(&self, map_id: u32) -> Result<Beatmap> {
        let response = self.send(self.client.build_get_beatmap(map_id))?;
        self.client.parse_get_beatmap(response)
    }

    /// `GET /set/{set_id}`
    pub fn fetch_beatmap_set(&self, set_id: u32) -> Result<BeatmapSet> {
        let response = self.send(self.client.build_get_beatmap_set(set_id))?;
        self.client.parse_get_beatmap_set(response)
    }

    /// `GET /search`, returning the service's `data` payload as-is.
    pub fn search(&self, query: &SearchQuery) -> Result<serde_json::Value> {
        let response = self.send(self.client.build_search(query))?;
        self.client.parse_search(response)
    }

    /// Download a set archive behind the CAPTCHA-gated state.
    pub fn download_file(&self, set_id: u32, key: &str) -> Result<Vec<u8>> {
        self.download_file_with_state(set_id, key, &VerificationState::default())
    }

    pub fn download_file_with_state(
        &self,
        set_id: u32,
        key: &str,
        state: &VerificationState,
    ) -> Result<Vec<u8>> {
        let response = self.send(self.client.build_download(set_id, key, state))?;
        self.client.parse_download(set_id, response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending chimu request");
        let response = self.transport.execute(&request)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received chimu response");
        Ok(response)
    }
}
