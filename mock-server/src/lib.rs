use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

pub const DOWNLOAD_KEY: &str = "mock-key";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Beatmap {
    pub beatmap_id: u32,
    pub parent_set_id: u32,
    pub diff_name: String,
    #[serde(rename = "FileMD5")]
    pub file_md5: String,
    pub mode: i32,
    #[serde(rename = "BPM")]
    pub bpm: f64,
    #[serde(rename = "AR")]
    pub ar: f64,
    #[serde(rename = "OD")]
    pub od: f64,
    #[serde(rename = "CS")]
    pub cs: f64,
    #[serde(rename = "HP")]
    pub hp: f64,
    pub total_length: u32,
    pub hit_length: u32,
    pub playcount: u64,
    pub passcount: u64,
    pub max_combo: u32,
    pub difficulty_rating: f64,
    pub osu_file: String,
    pub download_path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BeatmapSet {
    pub set_id: u32,
    pub children_beatmaps: Vec<Beatmap>,
    pub ranked_status: i32,
    pub approved_date: String,
    pub last_update: String,
    pub last_checked: String,
    pub artist: String,
    pub title: String,
    pub creator: String,
    pub source: String,
    pub tags: String,
    pub has_video: bool,
    pub genre: i32,
    pub language: String,
    pub favourites: u64,
    pub disabled: bool,
}

/// Read-only catalog served by the mock.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub sets: Vec<BeatmapSet>,
}

impl Catalog {
    /// Three sets with zero, one and five difficulties.
    pub fn seeded() -> Self {
        let discoprince = set(1, "Kenji Ninuma", "DISCOPRINCE", "peppy", 1, vec![(75, "Normal", 0, 2.4)]);
        let freedom_dive = set(
            39804,
            "xi",
            "FREEDOM DiVE",
            "Nakagawa-Kanon",
            1,
            vec![
                (129891, "FOUR DIMENSIONS", 0, 7.07),
                (130358, "Another", 0, 5.12),
                (131563, "Hyper", 0, 4.01),
                (132079, "Normal", 0, 2.33),
                (140267, "Taiko Oni", 1, 5.5),
            ],
        );
        let empty = set(2, "Unknown Artist", "Placeholder", "nobody", -2, Vec::new());
        Self {
            sets: vec![discoprince, empty, freedom_dive],
        }
    }

    fn set(&self, set_id: u32) -> Option<&BeatmapSet> {
        self.sets.iter().find(|s| s.set_id == set_id)
    }

    fn map(&self, map_id: u32) -> Option<&Beatmap> {
        self.sets
            .iter()
            .flat_map(|s| s.children_beatmaps.iter())
            .find(|b| b.beatmap_id == map_id)
    }
}

fn set(
    set_id: u32,
    artist: &str,
    title: &str,
    creator: &str,
    ranked_status: i32,
    diffs: Vec<(u32, &str, i32, f64)>,
) -> BeatmapSet {
    let children_beatmaps = diffs
        .into_iter()
        .map(|(beatmap_id, diff_name, mode, stars)| Beatmap {
            beatmap_id,
            parent_set_id: set_id,
            diff_name: diff_name.to_string(),
            file_md5: format!("{beatmap_id:032x}"),
            mode,
            bpm: 222.22,
            ar: 9.0,
            od: 8.0,
            cs: 4.0,
            hp: 5.0,
            total_length: 263,
            hit_length: 257,
            playcount: 1_000 * beatmap_id as u64,
            passcount: 100 * beatmap_id as u64,
            max_combo: 2385,
            difficulty_rating: stars,
            osu_file: format!("{artist} - {title} ({creator}) [{diff_name}].osu"),
            download_path: format!("/d/{set_id}"),
        })
        .collect();

    BeatmapSet {
        set_id,
        children_beatmaps,
        ranked_status,
        approved_date: "2008-06-23 07:17:33".to_string(),
        last_update: "2008-06-20 14:18:49".to_string(),
        last_checked: "2021-07-01 00:00:00".to_string(),
        artist: artist.to_string(),
        title: title.to_string(),
        creator: creator.to_string(),
        source: String::new(),
        tags: format!("{artist} {title}").to_lowercase(),
        has_video: false,
        genre: 2,
        language: "Instrumental".to_string(),
        favourites: 4096,
        disabled: false,
    }
}

pub type Db = Arc<Catalog>;

pub fn app() -> Router {
    app_with(Catalog::seeded())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(catalog);
    Router::new()
        .route("/v1/map/{id}", get(get_map))
        .route("/v1/set/{id}", get(get_set))
        .route("/v1/search", get(search))
        .route("/v1/download/{id}", get(download))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn ok(data: impl Serialize) -> Response {
    Json(json!({"code": 0, "data": data})).into_response()
}

fn fail(status: StatusCode, code: i32, message: &str) -> Response {
    (status, Json(json!({"code": code, "message": message}))).into_response()
}

async fn get_map(State(db): State<Db>, Path(id): Path<u32>) -> Response {
    match db.map(id) {
        Some(map) => ok(map),
        None => fail(StatusCode::NOT_FOUND, 104, "Beatmap not found."),
    }
}

async fn get_set(State(db): State<Db>, Path(id): Path<u32>) -> Response {
    match db.set(id) {
        Some(set) => ok(set),
        None => fail(StatusCode::NOT_FOUND, 104, "Beatmapset not found."),
    }
}

/// Supports `query` (substring of artist, title or creator), `mode` and
/// `amount`. Unknown keys are ignored.
async fn search(State(db): State<Db>, Query(params): Query<HashMap<String, String>>) -> Response {
    let amount = match params.get("amount").map(|a| a.parse::<usize>()) {
        None => usize::MAX,
        Some(Ok(amount)) => amount,
        Some(Err(_)) => return fail(StatusCode::BAD_REQUEST, 2, "amount must be a number"),
    };
    let mode = match params.get("mode").map(|m| m.parse::<i32>()) {
        None => None,
        Some(Ok(mode)) => Some(mode),
        Some(Err(_)) => return fail(StatusCode::BAD_REQUEST, 2, "mode must be a number"),
    };
    let needle = params.get("query").map(|q| q.to_lowercase());

    let found: Vec<&BeatmapSet> = db
        .sets
        .iter()
        .filter(|s| match &needle {
            Some(q) => [&s.artist, &s.title, &s.creator]
                .iter()
                .any(|field| field.to_lowercase().contains(q.as_str())),
            None => true,
        })
        .filter(|s| match mode {
            Some(m) => s.children_beatmaps.iter().any(|b| b.mode == m),
            None => true,
        })
        .take(amount)
        .collect();

    ok(found)
}

#[derive(Deserialize)]
pub struct DownloadParams {
    pub k: Option<String>,
    pub s: Option<String>,
}

/// Archive bytes for a set. Not a real zip, only recognisably shaped.
pub fn archive_bytes(set: &BeatmapSet) -> Vec<u8> {
    let mut bytes = vec![0x50, 0x4b, 0x03, 0x04];
    bytes.extend_from_slice(&set.set_id.to_le_bytes());
    bytes.extend_from_slice(format!("{} - {}", set.artist, set.title).as_bytes());
    bytes.push(0xff);
    bytes
}

async fn download(
    State(db): State<Db>,
    Path(id): Path<u32>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let Some(set) = db.set(id) else {
        return (StatusCode::NOT_FOUND, "no such set").into_response();
    };
    if params.k.as_deref() != Some(DOWNLOAD_KEY) {
        return fail(StatusCode::UNAUTHORIZED, 0, "invalid key");
    }
    match params.s.as_deref() {
        Some("hcaptcha") | Some("success") => {}
        _ => return fail(StatusCode::BAD_REQUEST, 3, "unknown verification state"),
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/x-osu-beatmap-archive".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{} {} - {}.osz\"", set.set_id, set.artist, set.title),
            ),
        ],
        archive_bytes(set),
    )
        .into_response()
}
