//! Domain records for the chimu beatmap catalog.
//!
//! # Design
//! Field names follow the service's PascalCase wire names through serde
//! renames, so serializing a decoded record yields the same object the
//! service sent. Rating fields keep the JSON number exactly as received, so
//! an integral `"AR": 9` is re-emitted as `9` rather than `9.0`. Records are
//! built fresh per response and never mutated by the client afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One difficulty of a beatmap set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Beatmap {
    #[serde(rename = "BeatmapId")]
    pub beatmap_id: u32,
    #[serde(rename = "ParentSetId")]
    pub parent_set_id: u32,
    #[serde(rename = "DiffName")]
    pub diff_name: String,
    #[serde(rename = "FileMD5")]
    pub file_md5: String,
    /// Raw game mode code. See [`Beatmap::game_mode`].
    #[serde(rename = "Mode")]
    pub mode: i32,
    #[serde(rename = "BPM")]
    pub bpm: Number,
    #[serde(rename = "AR")]
    pub ar: Number,
    #[serde(rename = "OD")]
    pub od: Number,
    #[serde(rename = "CS")]
    pub cs: Number,
    #[serde(rename = "HP")]
    pub hp: Number,
    /// Seconds.
    #[serde(rename = "TotalLength")]
    pub total_length: u32,
    /// Seconds of drain time.
    #[serde(rename = "HitLength")]
    pub hit_length: u32,
    #[serde(rename = "Playcount")]
    pub playcount: u64,
    #[serde(rename = "Passcount")]
    pub passcount: u64,
    #[serde(rename = "MaxCombo")]
    pub max_combo: u32,
    #[serde(rename = "DifficultyRating")]
    pub difficulty_rating: Number,
    #[serde(rename = "OsuFile")]
    pub osu_file: String,
    #[serde(rename = "DownloadPath")]
    pub download_path: String,
}

impl Beatmap {
    pub fn game_mode(&self) -> Option<GameMode> {
        GameMode::from_i32(self.mode)
    }

    pub fn bpm(&self) -> f64 {
        as_f64(&self.bpm)
    }

    pub fn ar(&self) -> f64 {
        as_f64(&self.ar)
    }

    pub fn od(&self) -> f64 {
        as_f64(&self.od)
    }

    pub fn cs(&self) -> f64 {
        as_f64(&self.cs)
    }

    pub fn hp(&self) -> f64 {
        as_f64(&self.hp)
    }

    /// Star rating.
    pub fn difficulty_rating(&self) -> f64 {
        as_f64(&self.difficulty_rating)
    }
}

// Every non-arbitrary-precision `Number` converts.
fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or_default()
}

/// A release grouping one or more beatmaps.
///
/// Date fields are kept as the service formats them; this crate does not
/// parse them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeatmapSet {
    #[serde(rename = "SetId")]
    pub set_id: u32,
    #[serde(rename = "ChildrenBeatmaps")]
    pub children_beatmaps: Vec<Beatmap>,
    #[serde(rename = "RankedStatus")]
    pub ranked_status: i32,
    #[serde(rename = "ApprovedDate")]
    pub approved_date: String,
    #[serde(rename = "LastUpdate")]
    pub last_update: String,
    #[serde(rename = "LastChecked")]
    pub last_checked: String,
    #[serde(rename = "Artist")]
    pub artist: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Creator")]
    pub creator: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "HasVideo")]
    pub has_video: bool,
    #[serde(rename = "Genre")]
    pub genre: i32,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Favourites")]
    pub favourites: u64,
    #[serde(rename = "Disabled")]
    pub disabled: bool,
}

impl BeatmapSet {
    pub fn ranked_status(&self) -> Option<RankedStatus> {
        RankedStatus::from_i32(self.ranked_status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum GameMode {
    Osu = 0,
    Taiko = 1,
    Catch = 2,
    Mania = 3,
}

impl GameMode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(mode: i32) -> Option<Self> {
        match mode {
            0 => Some(GameMode::Osu),
            1 => Some(GameMode::Taiko),
            2 => Some(GameMode::Catch),
            3 => Some(GameMode::Mania),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Osu => "osu!",
            GameMode::Taiko => "osu!taiko",
            GameMode::Catch => "osu!catch",
            GameMode::Mania => "osu!mania",
        }
    }
}

/// Ranked status codes as the upstream catalog reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RankedStatus {
    Graveyard = -2,
    Wip = -1,
    Pending = 0,
    Ranked = 1,
    Approved = 2,
    Qualified = 3,
    Loved = 4,
}

impl RankedStatus {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(status: i32) -> Option<Self> {
        match status {
            -2 => Some(RankedStatus::Graveyard),
            -1 => Some(RankedStatus::Wip),
            0 => Some(RankedStatus::Pending),
            1 => Some(RankedStatus::Ranked),
            2 => Some(RankedStatus::Approved),
            3 => Some(RankedStatus::Qualified),
            4 => Some(RankedStatus::Loved),
            _ => None,
        }
    }
}

/// Query parameters for the search endpoint, passed through verbatim.
///
/// The accepted keys are whatever the service documents; nothing here
/// validates them. `SearchQuery::default()` is the empty query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    params: BTreeMap<String, String>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Verification state sent as the `s` parameter of a download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VerificationState {
    /// CAPTCHA-gated download.
    #[default]
    Hcaptcha,
    /// Pre-verified download.
    Success,
    Other(String),
}

impl VerificationState {
    pub fn as_str(&self) -> &str {
        match self {
            VerificationState::Hcaptcha => "hcaptcha",
            VerificationState::Success => "success",
            VerificationState::Other(s) => s,
        }
    }
}

impl From<&str> for VerificationState {
    fn from(s: &str) -> Self {
        match s {
            "hcaptcha" => VerificationState::Hcaptcha,
            "success" => VerificationState::Success,
            other => VerificationState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
