//!
//! src/trends.rs  Andrew Belles  Oct 16th, 2026
//!
//! Splits a mix order into trends at every jump, drops trends that are
//! too short to be worth playing and re-flags the jumps that remain
//!
//!

use tracing::debug;

use crate::types::MixEntry;

/// Contiguous runs starting at index 0 and at every later jump
fn segments(order: Vec<MixEntry>) -> Vec<Vec<MixEntry>> {
    let mut out: Vec<Vec<MixEntry>> = Vec::new();
    for (idx, entry) in order.into_iter().enumerate() {
        if idx == 0 || entry.jump {
            out.push(Vec::new());
        }
        if let Some(current) = out.last_mut() {
            current.push(entry);
        }
    }
    out
}

/// Keeps trends of at least `min_len` tracks. The first kept track is never
/// a jump, the first track of every later kept trend always is. An empty
/// result means no usable mix.
pub fn filter_trends(order: Vec<MixEntry>, min_len: usize) -> Vec<MixEntry> {
    let all = segments(order);
    let total = all.len();

    let kept: Vec<Vec<MixEntry>> = all.into_iter()
        .filter(|seg| seg.len() >= min_len)
        .collect();
    debug!(segments = total, kept = kept.len(), min_len, "mix.trends.filter");

    kept.into_iter()
        .enumerate()
        .flat_map(|(seg_idx, seg)| {
            seg.into_iter().enumerate().map(move |(pos, entry)| MixEntry {
                jump: pos == 0 && seg_idx > 0,
                ..entry
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::tests::track;

    fn order(flags: &[bool]) -> Vec<MixEntry> {
        flags.iter()
            .enumerate()
            .map(|(i, &jump)| MixEntry { track: track(&format!("t{i}"), "4A", 120.0), jump })
            .collect()
    }

    fn ids(order: &[MixEntry]) -> Vec<&str> {
        order.iter().map(|e| e.track.id.as_str()).collect()
    }

    fn jumps(order: &[MixEntry]) -> Vec<bool> {
        order.iter().map(|e| e.jump).collect()
    }

    #[test]
    fn only_long_enough_trend_survives() {
        let out = filter_trends(order(&[false, false, true, false, true, false, false]), 3);
        assert_eq!(ids(&out), vec!["t4", "t5", "t6"]);
        assert_eq!(jumps(&out), vec![false, false, false]);
    }

    #[test]
    fn later_surviving_trends_start_with_a_jump() {
        let out = filter_trends(
            order(&[false, false, false, true, false, true, false, false, false]),
            3
        );
        assert_eq!(ids(&out), vec!["t0", "t1", "t2", "t5", "t6", "t7", "t8"]);
        assert_eq!(jumps(&out), vec![false, false, false, true, false, false, false]);
    }

    #[test]
    fn first_entry_starts_a_trend_even_when_flagged() {
        let out = filter_trends(order(&[true, false, false]), 3);
        assert_eq!(out.len(), 3);
        assert!(!out[0].jump);
    }

    #[test]
    fn nothing_survives_gives_empty_mix() {
        assert!(filter_trends(order(&[false, false, true, false]), 3).is_empty());
        assert!(filter_trends(Vec::new(), 3).is_empty());
    }

    #[test]
    fn min_len_of_one_keeps_everything() {
        let flags = [false, true, true, false];
        let out = filter_trends(order(&flags), 1);
        assert_eq!(jumps(&out), flags.to_vec());
    }
}
