//!
//! src/types.rs  Andrew Belles  Oct 16th, 2026
//!
//! Domain records shared by the sequencer and its collaborators, plus
//! the wire shapes returned by the search and key/bpm endpoints
//!
//!

use serde::{Deserialize, Serialize};

use crate::camelot::Camelot;

pub const PLAYBACK_URL_BASE: &str = "https://open.spotify.com/track/";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn playback_url(&self) -> String {
        format!("{PLAYBACK_URL_BASE}{}", self.0)
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A track as the sequencer sees it. Only tracks with both a key and a
/// positive bpm are ever handed to the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub artists: String,
    pub camelot: Option<Camelot>,
    pub camelot_label: String,
    pub bpm: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>
}

impl Track {
    pub fn is_mixable(&self) -> bool {
        self.camelot.is_some() && self.bpm.is_some_and(|b| b > 0.0)
    }
}

/// A track placed in a mix order. `jump` marks the start of a new trend
/// rather than a smooth continuation from the previous entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MixEntry {
    pub track: Track,
    pub jump: bool
}

impl MixEntry {
    pub fn smooth(track: Track) -> Self {
        Self { track, jump: false }
    }

    pub fn jump(track: Track) -> Self {
        Self { track, jump: true }
    }
}

/// Search result stub, GET /v1/search items
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackStub {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistStub>
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArtistStub {
    pub name: String
}

impl TrackStub {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    pub fn artist_names(&self) -> String {
        self.artists.iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub items: Vec<TrackStub>,
    pub total: u32
}

/// Track record as returned by the key/bpm endpoint. The seed and its
/// related tracks share this shape, related tracks live under `r`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrackRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "n", default)]
    pub name: Option<String>,
    #[serde(rename = "as", default)]
    pub artists: Vec<String>,
    #[serde(rename = "c", default)]
    pub camelot: Option<String>,
    #[serde(rename = "k", default)]
    pub key: Option<String>,
    #[serde(rename = "b", default)]
    pub bpm: Option<f64>,
    #[serde(rename = "d", alias = "dc", default)]
    pub danceability: Option<f64>,
    #[serde(rename = "e", alias = "en", default)]
    pub energy: Option<f64>,
    #[serde(rename = "r", default)]
    pub related: Option<Vec<TrackRecord>>
}

impl TrackRecord {
    /// Display label for the key, camelot code first
    pub fn key_label(&self) -> Option<String> {
        self.camelot.as_deref()
            .or(self.key.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
