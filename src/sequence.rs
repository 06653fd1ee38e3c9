//!
//! src/sequence.rs  Andrew Belles  Oct 16th, 2026
//!
//! Greedy mix ordering. Starting from the seed, repeatedly place the
//! remaining track that continues most smoothly from the last one; when
//! nothing continues, jump to the track best placed to start a new trend.
//!
//!

use tracing::debug;

use crate::camelot::is_adjacent;
use crate::tempo::{bpm_gap, bpm_matches};
use crate::types::{MixEntry, Track};

/// Key-adjacent and tempo-compatible, queried from `from` towards `to`
fn continues(from: &Track, to: &Track, tolerance: f64) -> bool {
    is_adjacent(from.camelot, to.camelot) && bpm_matches(from.bpm, to.bpm, tolerance)
}

/// Number of other remaining tracks that could follow `pool[idx]`
fn connectivity(pool: &[Track], idx: usize, tolerance: f64) -> usize {
    let track = &pool[idx];
    pool.iter()
        .enumerate()
        .filter(|&(j, other)| j != idx && continues(track, other, tolerance))
        .count()
}

/// Closest tempo among the smooth continuations, first one wins ties
fn pick_smooth(prev: &Track, pool: &[Track], tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, t) in pool.iter().enumerate() {
        if !continues(prev, t, tolerance) {
            continue;
        }
        let gap = bpm_gap(t.bpm, prev.bpm);
        if best.is_none_or(|(_, g)| gap < g) {
            best = Some((idx, gap));
        }
    }
    best.map(|(idx, _)| idx)
}

/// New trend anchor: most continuations first, then smallest tempo jump
fn pick_anchor(prev: &Track, pool: &[Track], tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, usize, f64)> = None;
    for idx in 0..pool.len() {
        let score = connectivity(pool, idx, tolerance);
        let gap = bpm_gap(pool[idx].bpm, prev.bpm);
        // ranks by (-score, gap) ascending
        let better = match best {
            None => true,
            Some((_, s, g)) => score > s || (score == s && gap < g)
        };
        if better {
            best = Some((idx, score, gap));
        }
    }
    best.map(|(idx, _, _)| idx)
}

/// Orders the seed followed by every candidate exactly once. Never drops a
/// candidate: when no smooth continuation exists a jump is forced.
/// `tolerance` is `MixConfig::bpm_tolerance`, `BPM_TOLERANCE` by default.
pub fn build_mix_order(seed: Track, candidates: Vec<Track>, tolerance: f64) -> Vec<MixEntry> {
    let mut order = Vec::with_capacity(candidates.len() + 1);
    order.push(MixEntry::smooth(seed));
    let mut remaining = candidates;

    while !remaining.is_empty() {
        let prev = &order[order.len() - 1].track;

        let entry = match pick_smooth(prev, &remaining, tolerance) {
            Some(idx) => MixEntry::smooth(remaining.remove(idx)),
            None => {
                let Some(idx) = pick_anchor(prev, &remaining, tolerance) else {
                    break;
                };
                let anchor = remaining.remove(idx);
                debug!(track = %anchor.id, key = %anchor.camelot_label, "mix.order.jump");
                MixEntry::jump(anchor)
            }
        };
        order.push(entry);
    }
    order
}
