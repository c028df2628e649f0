//! Client library for the chimu beatmap catalog API.
//!
//! # Overview
//! Four read-only operations (fetch a beatmap, fetch a beatmap set, search,
//! download a set archive) exposed through a blocking `SyncClient` and an
//! async `AsyncClient` with identical semantics.
//!
//! # Design
//! - `ChimuClient` is stateless: it builds `HttpRequest` values and parses
//!   `HttpResponse` values without touching the network.
//! - `SyncClient` and `AsyncClient` are thin adapters that only move those
//!   values across a `Transport` / `AsyncTransport`, so both share every URL
//!   and every decoding rule.
//! - JSON endpoints report failure in-band through a non-zero `code`; the
//!   download endpoint reports it through the HTTP status.
//! - Nothing is retried, cached or recovered locally; every failure is a
//!   `ChimuError`.
//!
//! ```no_run
//! use chimu_core::{SearchQuery, SyncClient};
//!
//! fn main() -> chimu_core::Result<()> {
//!     let client = SyncClient::new();
//!     let set = client.fetch_beatmap_set(1)?;
//!     println!("{} - {} ({} diffs)", set.artist, set.title, set.children_beatmaps.len());
//!
//!     let found = client.search(&SearchQuery::new().param("query", "discoprince"))?;
//!     println!("{found}");
//!     Ok(())
//! }
//! ```

pub mod blocking;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod nonblocking;
pub mod types;

pub use blocking::{SyncClient, Transport};
pub use client::ChimuClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ChimuError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use nonblocking::{AsyncClient, AsyncTransport};
pub use types::{Beatmap, BeatmapSet, GameMode, RankedStatus, SearchQuery, VerificationState};
