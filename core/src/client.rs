//! Stateless HTTP request builder and response parser for the chimu API.
//!
//! # Design
//! `ChimuClient` holds only a base URL and a user agent and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The blocking and async adapters execute the round-trip
//! in between, so both surfaces share every URL and every decoding rule.

use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::decode::{self, check_envelope, parse_body};
use crate::error::{ChimuError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Beatmap, BeatmapSet, SearchQuery, VerificationState};

/// Builds chimu requests and parses chimu responses without touching the
/// network.
#[derive(Debug, Clone)]
pub struct ChimuClient {
    base_url: String,
    user_agent: String,
}

impl Default for ChimuClient {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl ChimuClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_beatmap(&self, map_id: u32) -> HttpRequest {
        self.get(format!("{}/map/{map_id}", self.base_url))
    }

    pub fn build_get_beatmap_set(&self, set_id: u32) -> HttpRequest {
        self.get(format!("{}/set/{set_id}", self.base_url))
    }

    pub fn build_search(&self, query: &SearchQuery) -> HttpRequest {
        self.get(with_query(format!("{}/search", self.base_url), query.iter()))
    }

    pub fn build_download(&self, set_id: u32, key: &str, state: &VerificationState) -> HttpRequest {
        let params = [("k", key), ("s", state.as_str())];
        self.get(with_query(format!("{}/download/{set_id}", self.base_url), params))
    }

    pub fn parse_get_beatmap(&self, response: HttpResponse) -> Result<Beatmap> {
        let body = parse_body(&response.body)?;
        let data = logged(check_envelope(&body))?;
        logged(decode::decode_beatmap(data))
    }

    pub fn parse_get_beatmap_set(&self, response: HttpResponse) -> Result<BeatmapSet> {
        let body = parse_body(&response.body)?;
        let data = logged(check_envelope(&body))?;
        logged(decode::decode_beatmap_set(data))
    }

    /// The search payload is returned untouched; its schema belongs to the
    /// service.
    pub fn parse_search(&self, response: HttpResponse) -> Result<serde_json::Value> {
        let body = parse_body(&response.body)?;
        logged(check_envelope(&body)).cloned()
    }

    /// Only the HTTP status decides a download; the body is never inspected.
    pub fn parse_download(&self, set_id: u32, response: HttpResponse) -> Result<Vec<u8>> {
        if response.status != 200 {
            tracing::warn!(set_id, status = response.status, "download rejected");
            return Err(ChimuError::DownloadError {
                set_id,
                status: response.status,
            });
        }
        Ok(response.body)
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("user-agent".to_string(), self.user_agent.clone())],
        }
    }
}

/// Append `params` as a query string. No `?` is added when there are none.
fn with_query<'a>(mut url: String, params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut params = params.into_iter().peekable();
    if params.peek().is_none() {
        return url;
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    url.push('?');
    url.push_str(&query);
    url
}

fn logged<T>(result: Result<T>) -> Result<T> {
    match &result {
        Err(ChimuError::ApiError(message)) => tracing::warn!(%message, "chimu api signalled failure"),
        Err(e) => tracing::debug!(error = %e, "could not decode chimu response"),
        Ok(_) => {}
    }
    result
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client() -> ChimuClient {
        ChimuClient::new("http://localhost:3000/v1")
    }

    fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
        HttpResponse::new(status, body.to_string())
    }

    fn map_json() -> serde_json::Value {
        json!({
            "BeatmapId": 75,
            "ParentSetId": 1,
            "DiffName": "Normal",
            "FileMD5": "a5b99395a42bd55bc5eb1d2411cbdf8b",
            "Mode": 0,
            "BPM": 119.5,
            "AR": 6.0,
            "OD": 6.0,
            "CS": 4.0,
            "HP": 6.0,
            "TotalLength": 142,
            "HitLength": 109,
            "Playcount": 612345,
            "Passcount": 71234,
            "MaxCombo": 314,
            "DifficultyRating": 2.4,
            "OsuFile": "Kenji Ninuma - DISCOPRINCE (peppy) [Normal].osu",
            "DownloadPath": "/d/1"
        })
    }

    #[test]
    fn default_client_targets_public_api() {
        let req = ChimuClient::default().build_get_beatmap(75);
        assert_eq!(req.url, "https://api.chimu.moe/v1/map/75");
    }

    #[test]
    fn build_get_beatmap_produces_correct_request() {
        let req = client().build_get_beatmap(75);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v1/map/75");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers[0].0, "user-agent");
    }

    #[test]
    fn build_get_beatmap_set_produces_correct_request() {
        let req = client().build_get_beatmap_set(1);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v1/set/1");
    }

    #[test]
    fn build_search_without_params_has_no_query_string() {
        let req = client().build_search(&SearchQuery::default());
        assert_eq!(req.url, "http://localhost:3000/v1/search");
    }

    #[test]
    fn build_search_passes_params_through() {
        let query = SearchQuery::new().param("query", "kenji ninuma").param("mode", "0");
        let req = client().build_search(&query);
        assert_eq!(
            req.url,
            "http://localhost:3000/v1/search?mode=0&query=kenji+ninuma"
        );
    }

    #[test]
    fn build_download_carries_key_and_state() {
        let req = client().build_download(1, "secret", &VerificationState::default());
        assert_eq!(
            req.url,
            "http://localhost:3000/v1/download/1?k=secret&s=hcaptcha"
        );

        let req = client().build_download(1, "secret", &VerificationState::Success);
        assert!(req.url.ends_with("s=success"));
    }

    #[test]
    fn custom_user_agent_is_sent() {
        let config = ClientConfig::new("http://localhost:3000/v1").user_agent("my-bot/2.0");
        let req = ChimuClient::from_config(&config).build_get_beatmap(1);
        assert_eq!(req.headers, vec![("user-agent".to_string(), "my-bot/2.0".to_string())]);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ChimuClient::new("http://localhost:3000/v1/");
        let req = client.build_get_beatmap_set(1);
        assert_eq!(req.url, "http://localhost:3000/v1/set/1");
    }

    #[test]
    fn parse_get_beatmap_success() {
        let map = client()
            .parse_get_beatmap(json_response(200, json!({"code": 0, "data": map_json()})))
            .unwrap();
        assert_eq!(map.beatmap_id, 75);
        assert_eq!(map.diff_name, "Normal");
    }

    #[test]
    fn parse_get_beatmap_api_error_ignores_http_status() {
        let err = client()
            .parse_get_beatmap(json_response(404, json!({"code": 104, "message": "Beatmap not found."})))
            .unwrap_err();
        assert_eq!(err, ChimuError::ApiError("Beatmap not found.".to_string()));
    }

    #[test]
    fn parse_get_beatmap_bad_json() {
        let err = client()
            .parse_get_beatmap(HttpResponse::new(502, "bad gateway"))
            .unwrap_err();
        assert!(matches!(err, ChimuError::TransportError(_)));
    }

    #[test]
    fn parse_get_beatmap_set_api_error() {
        let err = client()
            .parse_get_beatmap_set(json_response(200, json!({"code": 1, "message": "set is gone"})))
            .unwrap_err();
        assert_eq!(err, ChimuError::ApiError("set is gone".to_string()));
    }

    #[test]
    fn parse_search_returns_data_unmodified() {
        let data = client()
            .parse_search(json_response(200, json!({"code": 0, "data": {"found": 3}})))
            .unwrap();
        assert_eq!(data, json!({"found": 3}));
    }

    #[test]
    fn parse_search_api_error() {
        let err = client()
            .parse_search(json_response(200, json!({"code": 2, "message": "bad query"})))
            .unwrap_err();
        assert_eq!(err, ChimuError::ApiError("bad query".to_string()));
    }

    #[test]
    fn parse_download_returns_exact_bytes() {
        let body: Vec<u8> = vec![0x50, 0x4b, 0x03, 0x04, 0x00, 0xff];
        let bytes = client()
            .parse_download(1, HttpResponse::new(200, body.clone()))
            .unwrap();
        assert_eq!(bytes, body);
    }

    #[test]
    fn parse_download_non_200_ignores_body() {
        let ok_looking = json!({"code": 0, "data": {}}).to_string();
        for status in [201, 302, 403, 404, 500] {
            let err = client()
                .parse_download(42, HttpResponse::new(status, ok_looking.clone()))
                .unwrap_err();
            assert_eq!(err, ChimuError::DownloadError { set_id: 42, status });
        }
    }
}
