//!
//! src/format.rs  Andrew Belles  Oct 16th, 2026
//!
//! Console listing of a finished mix, columns aligned on the widest
//! artist, title and key
//!
//!

use std::io::Write;

use crate::errors::MixError;
use crate::types::MixEntry;

pub const JUMP_MARKER: &str = "  [jump to new trend]";

#[derive(Debug, Clone, Copy, Default)]
pub struct GridFormatter {
    artist_width: usize,
    title_width: usize,
    key_width: usize
}

impl GridFormatter {
    pub fn for_entries(entries: &[MixEntry]) -> Self {
        let mut grid = Self::default();
        for e in entries {
            grid.artist_width = grid.artist_width.max(e.track.artists.chars().count());
            grid.title_width = grid.title_width.max(e.track.name.chars().count());
            grid.key_width = grid.key_width.max(e.track.camelot_label.chars().count());
        }
        grid
    }

    /// `artist - title - key - bpm (Δ delta)`
    pub fn row(&self, entry: &MixEntry, delta: Option<f64>) -> String {
        let t = &entry.track;
        let bpm = t.bpm.map_or_else(|| "N/A".to_string(), |b| format!("{b:.0}"));
        let delta = delta.map_or_else(|| "Δ N/A".to_string(), |d| format!("Δ {d:+.0}"));
        format!(
            "{:<aw$} - {:<tw$} - {:<kw$} - {:>4} ({})",
            t.artists, t.name, t.camelot_label, bpm, delta,
            aw = self.artist_width, tw = self.title_width, kw = self.key_width
        )
    }
}

/// Numbered rows, tempo change against the previous row (0 for the first)
pub fn mix_lines(entries: &[MixEntry]) -> Vec<String> {
    let fmt = GridFormatter::for_entries(entries);
    let mut prev_bpm: Option<f64> = None;

    entries.iter()
        .enumerate()
        .map(|(idx, entry)| {
            let delta = match (prev_bpm, entry.track.bpm) {
                (Some(p), Some(b)) => b - p,
                _ => 0.0
            };
            prev_bpm = entry.track.bpm;

            let mut line = format!("{:02}. {}", idx + 1, fmt.row(entry, Some(delta)));
            if entry.jump {
                line.push_str(JUMP_MARKER);
            }
            line
        })
        .collect()
}

pub fn display_mix<W: Write>(entries: &[MixEntry], out: &mut W) -> Result<(), MixError> {
    writeln!(out, "\nDJ mix order (console):")?;
    for line in mix_lines(entries) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
