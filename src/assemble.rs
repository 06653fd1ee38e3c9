//!
//! src/assemble.rs  Andrew Belles  Oct 16th, 2026
//!
//! Turns key/bpm records and search stubs into Tracks. Records without a
//! usable key or tempo stop here and never reach the sequencer.
//!
//!

use std::collections::HashSet;

use tracing::debug;

use crate::camelot::parse_camelot;
use crate::types::{Track, TrackId, TrackRecord, TrackStub};

const UNKNOWN: &str = "Unknown";
const NO_KEY: &str = "N/A";

/// Mood features sometimes arrive as 0-100; the vibe filter works on 0-1.
/// Scale is decided per value: anything above 1 is read as a percentage,
/// so a percentage of exactly 0 or 1 is taken as already unit scaled.
fn unit_scale(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| if v > 1.0 { v / 100.0 } else { v })
}

fn positive(bpm: Option<f64>) -> Option<f64> {
    bpm.filter(|b| b.is_finite() && *b > 0.0)
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn join_artists(artists: &[String]) -> Option<String> {
    let joined = artists.join(", ");
    (!joined.trim().is_empty()).then_some(joined)
}

/// Related tracks that can be mixed: id, key and tempo present, no
/// duplicates and never the seed itself. Source order is kept.
pub fn build_candidates(records: &[TrackRecord], seed_id: &TrackId) -> Vec<Track> {
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(seed_id.as_str());

    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let Some(id) = record.id.as_deref().filter(|id| !id.trim().is_empty()) else {
            continue;
        };
        let camelot = parse_camelot(record.camelot.as_deref());
        let bpm = positive(record.bpm);
        if camelot.is_none() || bpm.is_none() {
            debug!(track = id, "assemble.skip.incomplete");
            continue;
        }
        if !seen.insert(id) {
            debug!(track = id, "assemble.skip.duplicate");
            continue;
        }

        out.push(Track {
            id: TrackId(id.to_string()),
            name: non_empty(record.name.as_deref()).unwrap_or_else(|| UNKNOWN.to_string()),
            artists: record.artists.join(", "),
            camelot,
            camelot_label: record.key_label().unwrap_or_else(|| NO_KEY.to_string()),
            bpm,
            danceability: unit_scale(record.danceability),
            energy: unit_scale(record.energy)
        });
    }
    out
}

/// First round: display fields from the picked search result, key, tempo
/// and mood from the key/bpm record
pub fn seed_from_stub(id: TrackId, stub: &TrackStub, record: &TrackRecord) -> Track {
    Track {
        id,
        name: stub.display_name().to_string(),
        artists: stub.artist_names(),
        camelot: parse_camelot(record.camelot.as_deref()),
        camelot_label: record.key_label().unwrap_or_else(|| NO_KEY.to_string()),
        bpm: positive(record.bpm),
        danceability: unit_scale(record.danceability),
        energy: unit_scale(record.energy)
    }
}

/// Chained rounds: the record wins, gaps are filled from the track that
/// ended the previous mix
pub fn seed_from_record(id: TrackId, record: &TrackRecord, fallback: Option<&Track>) -> Track {
    let name = non_empty(record.name.as_deref())
        .or_else(|| fallback.map(|t| t.name.clone()))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let artists = join_artists(&record.artists)
        .or_else(|| fallback.map(|t| t.artists.clone()))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let parsed = parse_camelot(record.camelot.as_deref());
    let (camelot, camelot_label) = match (parsed, fallback) {
        (Some(c), _) => (Some(c), record.key_label().unwrap_or_else(|| c.to_string())),
        (None, Some(t)) if t.camelot.is_some() => (t.camelot, t.camelot_label.clone()),
        _ => (None, record.key_label().unwrap_or_else(|| NO_KEY.to_string()))
    };

    Track {
        id,
        name,
        artists,
        camelot,
        camelot_label,
        bpm: positive(record.bpm).or_else(|| fallback.and_then(|t| t.bpm)),
        danceability: unit_scale(record.danceability)
            .or_else(|| fallback.and_then(|t| t.danceability)),
        energy: unit_scale(record.energy).or_else(|| fallback.and_then(|t| t.energy))
    }
}
