//!
//! src/export.rs  Andrew Belles  Oct 16th, 2026
//!
//! Writes the playback urls of a session to a plain text playlist named
//! after a random title and a filesystem safe timestamp
//!
//!

use std::path::{Path, PathBuf};
use std::io::Write;

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use rand::{seq::SliceRandom, Rng};
use tracing::info;

use crate::errors::MixError;

const ADJECTIVES: [&str; 32] = [
    "amber", "bold", "brisk", "cosmic", "crimson", "dusky", "electric", "fading",
    "gentle", "golden", "hazy", "hidden", "icy", "lucid", "lunar", "mellow",
    "midnight", "misty", "neon", "pale", "quiet", "restless", "rusty", "silent",
    "silver", "smoky", "solar", "starry", "velvet", "violet", "wild", "wistful"
];

const NOUNS: [&str; 32] = [
    "aurora", "breeze", "canyon", "cascade", "comet", "current", "dawn", "delta",
    "drift", "echo", "ember", "falcon", "garden", "harbor", "horizon", "lagoon",
    "meadow", "mirage", "nebula", "orbit", "pulse", "reef", "ripple", "river",
    "shadow", "signal", "skyline", "tide", "voyage", "wave", "willow", "zephyr"
];

/// Keeps `[A-Za-z0-9 _.-]`, trims, falls back to "seed" when nothing is left
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "seed".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th"
    }
}

/// "Sep 3rd 2-05PM 2025", hyphen instead of colon to stay filename safe
pub fn human_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display
{
    let day = ts.day();
    let (is_pm, hour_12) = ts.hour12();
    format!(
        "{} {}{} {}-{:02}{} {}",
        ts.format("%b"),
        day,
        ordinal_suffix(day),
        hour_12,
        ts.minute(),
        if is_pm { "PM" } else { "AM" },
        ts.year()
    )
}

/// Capitalised adjectives followed by one noun, e.g. "Velvet Comet"
pub fn random_mix_title<R: Rng + ?Sized>(words: usize, rng: &mut R) -> String {
    let words = words.max(1);
    let mut parts: Vec<&str> = Vec::with_capacity(words);
    for _ in 1..words {
        parts.extend(ADJECTIVES.choose(rng));
    }
    parts.extend(NOUNS.choose(rng));

    parts.iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct PlaylistSink {
    root: PathBuf
}

impl PlaylistSink {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn file_name<Tz: TimeZone>(title: &str, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display
    {
        sanitize_filename(&format!("{title}_{}.txt", human_timestamp(now)))
    }

    /// Newline separated urls, written to a temp file then moved in place
    pub fn write_playlist<Tz: TimeZone>(
        &self,
        title: &str,
        urls: &[String],
        now: &DateTime<Tz>
    ) -> Result<PathBuf, MixError>
    where
        Tz::Offset: std::fmt::Display
    {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(Self::file_name(title, now));

        let mut temp = tempfile::NamedTempFile::new_in(&self.root)?;
        temp.write_all(urls.join("\n").as_bytes())?;
        temp.flush()?;
        temp.persist(&path)?;

        info!(path = %path.display(), tracks = urls.len(), "export.done");
        Ok(path)
    }
}
