//! Blocking and async adapters fed identical canned responses must agree.
//!
//! Both adapters run over in-memory transports here, so every case is
//! deterministic and records the exact request that was issued.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chimu_core::{
    AsyncClient, AsyncTransport, ChimuClient, ChimuError, HttpRequest, HttpResponse, SearchQuery,
    SyncClient, Transport,
};
use serde_json::{json, Value};

const BASE_URL: &str = "http://chimu.test/v1";

/// Replies with the same response to every request and remembers the URLs.
struct Canned {
    response: HttpResponse,
    seen: Mutex<Vec<String>>,
}

impl Canned {
    fn new(response: HttpResponse) -> Self {
        Self {
            response,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn json(body: Value) -> Self {
        Self::new(HttpResponse::new(200, body.to_string()))
    }

    fn urls(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for Canned {
    fn execute(&self, request: &HttpRequest) -> chimu_core::Result<HttpResponse> {
        self.seen.lock().unwrap().push(request.url.clone());
        Ok(self.response.clone())
    }
}

#[async_trait]
impl AsyncTransport for Canned {
    async fn execute(&self, request: HttpRequest) -> chimu_core::Result<HttpResponse> {
        self.seen.lock().unwrap().push(request.url);
        Ok(self.response.clone())
    }
}

/// Always fails as if the connection dropped.
struct Broken;

impl Transport for Broken {
    fn execute(&self, _: &HttpRequest) -> chimu_core::Result<HttpResponse> {
        Err(ChimuError::TransportError("connection reset".to_string()))
    }
}

#[async_trait]
impl AsyncTransport for Broken {
    async fn execute(&self, _: HttpRequest) -> chimu_core::Result<HttpResponse> {
        Err(ChimuError::TransportError("connection reset".to_string()))
    }
}

/// Counts exchanges that are still alive. Decremented when the exchange's
/// future is dropped, whether it finished or not.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(count))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Hangs forever on its first exchange, then answers normally.
struct Stalling {
    response: HttpResponse,
    stall_next: AtomicBool,
    started: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
}

#[async_trait]
impl AsyncTransport for Stalling {
    async fn execute(&self, _: HttpRequest) -> chimu_core::Result<HttpResponse> {
        let _guard = InFlight::enter(&self.in_flight);
        self.started.fetch_add(1, Ordering::SeqCst);
        if self.stall_next.swap(false, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(self.response.clone())
    }
}

fn sync_client<T: Transport>(transport: T) -> SyncClient<T> {
    SyncClient::with_transport(ChimuClient::new(BASE_URL), transport)
}

fn async_client<T: AsyncTransport>(transport: T) -> AsyncClient<T> {
    AsyncClient::with_transport(ChimuClient::new(BASE_URL), transport)
}

fn map_json(id: u32) -> Value {
    json!({
        "BeatmapId": id,
        "ParentSetId": 39804,
        "DiffName": format!("diff {id}"),
        "FileMD5": "da8aae79c8f3306b5d65ec951874a7fb",
        "Mode": 0,
        "BPM": 222.22,
        "AR": 9,
        "OD": 8,
        "CS": 4.0,
        "HP": 5.0,
        "TotalLength": 263,
        "HitLength": 257,
        "Playcount": 9_876_543,
        "Passcount": 123_456,
        "MaxCombo": 2385,
        "DifficultyRating": 7.07,
        "OsuFile": "xi - FREEDOM DiVE (Nakagawa-Kanon) [FOUR DIMENSIONS].osu",
        "DownloadPath": "/d/39804"
    })
}

fn set_json(children: usize) -> Value {
    json!({
        "SetId": 39804,
        "ChildrenBeatmaps": (0..children as u32).map(|i| map_json(129891 + i)).collect::<Vec<_>>(),
        "RankedStatus": 1,
        "ApprovedDate": "2008-06-23 07:17:33",
        "LastUpdate": "2008-06-20 14:18:49",
        "LastChecked": "2021-07-01 00:00:00",
        "Artist": "xi",
        "Title": "FREEDOM DiVE",
        "Creator": "Nakagawa-Kanon",
        "Source": "BMS",
        "Tags": "parousia",
        "HasVideo": false,
        "Genre": 2,
        "Language": "Instrumental",
        "Favourites": 20_000,
        "Disabled": false
    })
}

#[tokio::test]
async fn beatmap_parity_and_round_trip() {
    let body = json!({"code": 0, "data": map_json(129891)});

    let sync = sync_client(Canned::json(body.clone()));
    let asyn = async_client(Canned::json(body));

    let a = sync.fetch_beatmap(129891).unwrap();
    let b = asyn.fetch_beatmap(129891).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(serde_json::to_value(&a).unwrap(), map_json(129891));
}

#[tokio::test]
async fn set_parity_for_zero_one_and_five_children() {
    for n in [0, 1, 5] {
        let body = json!({"code": 0, "data": set_json(n)});

        let a = sync_client(Canned::json(body.clone())).fetch_beatmap_set(39804).unwrap();
        let b = async_client(Canned::json(body))
            .fetch_beatmap_set(39804)
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.children_beatmaps.len(), n);
        assert_eq!(serde_json::to_value(&a).unwrap(), set_json(n));
    }
}

#[tokio::test]
async fn api_errors_carry_the_message_on_every_json_operation() {
    let body = json!({"code": 1, "message": "chimu is on fire"});
    let expected = ChimuError::ApiError("chimu is on fire".to_string());

    let sync = sync_client(Canned::json(body.clone()));
    assert_eq!(sync.fetch_beatmap(1).unwrap_err(), expected);
    assert_eq!(sync.fetch_beatmap_set(1).unwrap_err(), expected);
    assert_eq!(sync.search(&SearchQuery::default()).unwrap_err(), expected);

    let asyn = async_client(Canned::json(body));
    assert_eq!(asyn.fetch_beatmap(1).await.unwrap_err(), expected);
    assert_eq!(asyn.fetch_beatmap_set(1).await.unwrap_err(), expected);
    assert_eq!(asyn.search(&SearchQuery::default()).await.unwrap_err(), expected);
}

#[tokio::test]
async fn missing_field_is_malformed_on_both_surfaces() {
    let mut data = set_json(1);
    data.as_object_mut().unwrap().remove("Favourites");
    let body = json!({"code": 0, "data": data});

    let a = sync_client(Canned::json(body.clone())).fetch_beatmap_set(39804).unwrap_err();
    let b = async_client(Canned::json(body))
        .fetch_beatmap_set(39804)
        .await
        .unwrap_err();

    assert_eq!(a, b);
    assert!(matches!(a, ChimuError::MalformedResponseError { ref field, .. } if field == "Favourites"));
}

#[tokio::test]
async fn empty_search_sends_bare_path_and_returns_data() {
    let body = json!({"code": 0, "data": {"found": 3}});

    let sync = sync_client(Canned::json(body.clone()));
    assert_eq!(sync.search(&SearchQuery::default()).unwrap(), json!({"found": 3}));

    let asyn = async_client(Canned::json(body));
    assert_eq!(asyn.search(&SearchQuery::default()).await.unwrap(), json!({"found": 3}));

    let canned = Canned::json(json!({"code": 0, "data": {"found": 3}}));
    let sync = SyncClient::with_transport(ChimuClient::new(BASE_URL), &canned);
    sync.search(&SearchQuery::new()).unwrap();
    assert_eq!(canned.urls(), vec![format!("{BASE_URL}/search")]);
}

#[tokio::test]
async fn download_returns_body_or_download_error() {
    let archive: Vec<u8> = vec![0x50, 0x4b, 0x03, 0x04, 0x00, 0x10, 0xff];

    let ok = HttpResponse::new(200, archive.clone());
    assert_eq!(sync_client(Canned::new(ok.clone())).download_file(1, "key").unwrap(), archive);
    assert_eq!(async_client(Canned::new(ok)).download_file(1, "key").await.unwrap(), archive);

    let rejected = HttpResponse::new(403, json!({"code": 0, "data": "looks fine"}).to_string());
    let expected = ChimuError::DownloadError { set_id: 1, status: 403 };
    assert_eq!(
        sync_client(Canned::new(rejected.clone())).download_file(1, "key").unwrap_err(),
        expected
    );
    assert_eq!(
        async_client(Canned::new(rejected)).download_file(1, "key").await.unwrap_err(),
        expected
    );
}

#[tokio::test]
async fn transport_failures_pass_through_untouched() {
    let expected = ChimuError::TransportError("connection reset".to_string());
    assert_eq!(sync_client(Broken).fetch_beatmap(1).unwrap_err(), expected);
    assert_eq!(async_client(Broken).download_file(1, "k").await.unwrap_err(), expected);
}

#[tokio::test]
async fn cancelling_an_async_call_mid_exchange_releases_it() {
    let started = Arc::new(AtomicUsize::new(0));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let client = async_client(Stalling {
        response: HttpResponse::new(200, json!({"code": 0, "data": map_json(1)}).to_string()),
        stall_next: AtomicBool::new(true),
        started: Arc::clone(&started),
        in_flight: Arc::clone(&in_flight),
    });

    let mut pending = Box::pin(client.fetch_beatmap(1));
    let outcome = tokio::time::timeout(Duration::from_millis(50), &mut pending).await;
    assert!(outcome.is_err());
    assert_eq!(started.load(Ordering::SeqCst), 1);
    assert_eq!(in_flight.load(Ordering::SeqCst), 1);

    drop(pending);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);

    assert_eq!(client.fetch_beatmap(1).await.unwrap().beatmap_id, 1);
    assert_eq!(started.load(Ordering::SeqCst), 2);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);
}
