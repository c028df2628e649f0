//! Response decoding for the chimu JSON envelope.
//!
//! # Design
//! Every JSON endpoint answers with `{"code": <int>, ...}`. A zero code
//! carries the payload under `data`; anything else carries a `message`.
//! Records are decoded field by field from the raw JSON object so a missing
//! or mistyped field is reported by name instead of as a generic parse
//! failure. There is one beatmap decoder, used both for a lone map and for
//! every child of a set.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ChimuError, Result};
use crate::types::{Beatmap, BeatmapSet};

/// Parse a response body as JSON. A body that is not JSON means the
/// exchange did not reach the API proper, so it is a transport failure.
pub fn parse_body(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body)
        .map_err(|e| ChimuError::TransportError(format!("response body is not JSON: {e}")))
}

/// Check the envelope's `code` and return the `data` payload on success.
///
/// Only zero means success; the magnitude of a non-zero code carries no
/// meaning here.
pub fn check_envelope(body: &Value) -> Result<&Value> {
    let envelope = body
        .as_object()
        .ok_or_else(|| ChimuError::invalid("code", "expected a JSON object envelope"))?;

    let code = envelope.get("code").ok_or_else(|| ChimuError::missing("code"))?;
    let failed = match (code.as_i64(), code.as_u64()) {
        (Some(n), _) => n != 0,
        (None, Some(n)) => n != 0,
        _ => return Err(ChimuError::invalid("code", format!("expected an integer, got {code}"))),
    };

    if failed {
        let message = envelope
            .get("message")
            .ok_or_else(|| ChimuError::missing("message"))?
            .as_str()
            .ok_or_else(|| ChimuError::invalid("message", "expected a string"))?;
        return Err(ChimuError::ApiError(message.to_string()));
    }

    envelope.get("data").ok_or_else(|| ChimuError::missing("data"))
}

/// Decode one beatmap object.
pub fn decode_beatmap(value: &Value) -> Result<Beatmap> {
    let fields = Fields::new(value)?;

    Ok(Beatmap {
        beatmap_id: fields.get("BeatmapId")?,
        parent_set_id: fields.get("ParentSetId")?,
        diff_name: fields.get("DiffName")?,
        file_md5: fields.get("FileMD5")?,
        mode: fields.get("Mode")?,
        bpm: fields.get("BPM")?,
        ar: fields.get("AR")?,
        od: fields.get("OD")?,
        cs: fields.get("CS")?,
        hp: fields.get("HP")?,
        total_length: fields.get("TotalLength")?,
        hit_length: fields.get("HitLength")?,
        playcount: fields.get("Playcount")?,
        passcount: fields.get("Passcount")?,
        max_combo: fields.get("MaxCombo")?,
        difficulty_rating: fields.get("DifficultyRating")?,
        osu_file: fields.get("OsuFile")?,
        download_path: fields.get("DownloadPath")?,
    })
}

/// Decode a beatmap set and, in source order, each of its children.
pub fn decode_beatmap_set(value: &Value) -> Result<BeatmapSet> {
    let fields = Fields::new(value)?;

    let children = fields
        .raw("ChildrenBeatmaps")?
        .as_array()
        .ok_or_else(|| ChimuError::invalid("ChildrenBeatmaps", "expected an array"))?;

    let children_beatmaps = children
        .iter()
        .enumerate()
        .map(|(i, child)| {
            decode_beatmap(child).map_err(|e| nest(e, &format!("ChildrenBeatmaps[{i}]")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BeatmapSet {
        set_id: fields.get("SetId")?,
        children_beatmaps,
        ranked_status: fields.get("RankedStatus")?,
        approved_date: fields.get("ApprovedDate")?,
        last_update: fields.get("LastUpdate")?,
        last_checked: fields.get("LastChecked")?,
        artist: fields.get("Artist")?,
        title: fields.get("Title")?,
        creator: fields.get("Creator")?,
        source: fields.get("Source")?,
        tags: fields.get("Tags")?,
        has_video: fields.get("HasVideo")?,
        genre: fields.get("Genre")?,
        language: fields.get("Language")?,
        favourites: fields.get("Favourites")?,
        disabled: fields.get("Disabled")?,
    })
}

struct Fields<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(value: &'a Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ChimuError::invalid("data", "expected an object"))?;
        Ok(Self { object })
    }

    fn raw(&self, name: &str) -> Result<&'a Value> {
        self.object.get(name).ok_or_else(|| ChimuError::missing(name))
    }

    fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        T::deserialize(self.raw(name)?).map_err(|e| ChimuError::invalid(name, e))
    }
}

/// Prefix a malformed-field path with the position of the enclosing element.
fn nest(err: ChimuError, prefix: &str) -> ChimuError {
    match err {
        ChimuError::MalformedResponseError { field, reason } if field == "data" => {
            ChimuError::MalformedResponseError {
                field: prefix.to_string(),
                reason,
            }
        }
        ChimuError::MalformedResponseError { field, reason } => {
            ChimuError::MalformedResponseError {
                field: format!("{prefix}.{field}"),
                reason,
            }
        }
        other => other,
    }
}
