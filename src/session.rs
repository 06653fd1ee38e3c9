//!
//! src/session.rs  Andrew Belles  Oct 16th, 2026
//!
//! The interactive mix session. Each round looks up the current seed,
//! sequences its related tracks, shows the mix and optionally continues
//! from the last track, accumulating playback urls across rounds.
//!
//!

use std::fmt;
use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::assemble::{build_candidates, seed_from_record, seed_from_stub};
use crate::config::MixConfig;
use crate::errors::MixError;
use crate::fetch::MetadataSource;
use crate::format::display_mix;
use crate::select::prompt_line;
use crate::sequence::build_mix_order;
use crate::trends::filter_trends;
use crate::types::{MixEntry, Track, TrackId, TrackStub};
use crate::vibe::{filter_by_vibe, VibeTolerance};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Unavailable,
    SeedIncomplete,
    NoCandidates,
    NoTrend(usize),
    UserDone
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Unavailable =>
                write!(f, "Unable to fetch track data or recommendations; stopping."),
            StopReason::SeedIncomplete =>
                write!(f, "Seed is missing Camelot key or BPM; cannot build DJ mix order."),
            StopReason::NoCandidates =>
                write!(f, "No recommendations returned; stopping."),
            StopReason::NoTrend(min) =>
                write!(f, "No trend segment found with {min}+ tracks; stopping."),
            StopReason::UserDone =>
                write!(f, "Done.")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    Mixed(Vec<MixEntry>),
    Stop(StopReason)
}

/// Where the next round starts from
enum SeedSource<'a> {
    Picked(&'a TrackStub),
    Chained(&'a Track)
}

#[derive(Debug, Default)]
pub struct SessionReport {
    pub urls: Vec<String>,
    pub rounds: usize,
    pub stop: Option<StopReason>
}

pub struct MixSession<'a, M: MetadataSource + ?Sized> {
    source: &'a M,
    cfg: &'a MixConfig
}

impl<'a, M: MetadataSource + ?Sized> MixSession<'a, M> {
    pub fn new(source: &'a M, cfg: &'a MixConfig) -> Self {
        Self { source, cfg }
    }

    /// One round: lookup, assemble, pre-filter, order, keep usable trends
    async fn round(&self, seed_id: &TrackId, from: SeedSource<'_>) -> RoundOutcome {
        let Some(details) = self.source.track_details(seed_id).await else {
            return RoundOutcome::Stop(StopReason::Unavailable);
        };
        let related = details.related.as_deref().unwrap_or_default();

        let seed = match from {
            SeedSource::Picked(stub) => seed_from_stub(seed_id.clone(), stub, &details.seed),
            SeedSource::Chained(prev) => seed_from_record(seed_id.clone(), &details.seed, Some(prev))
        };
        if !seed.is_mixable() {
            return RoundOutcome::Stop(StopReason::SeedIncomplete);
        }

        let mut candidates = build_candidates(related, seed_id);
        if candidates.is_empty() {
            return RoundOutcome::Stop(StopReason::NoCandidates);
        }

        if self.cfg.vibe_filter {
            let tol = VibeTolerance {
                danceability: self.cfg.danceability_tolerance,
                energy: self.cfg.energy_tolerance
            };
            let before = candidates.len();
            let filtered = filter_by_vibe(candidates.clone(), &seed, tol);
            if filtered.is_empty() {
                warn!(before, "mix.vibe.empty, keeping unfiltered pool");
            } else {
                info!(before, after = filtered.len(), "mix.vibe.filter");
                candidates = filtered;
            }
        }

        let pool = candidates.len();
        let order = build_mix_order(seed, candidates, self.cfg.bpm_tolerance);
        let mix = filter_trends(order, self.cfg.min_trend_len);
        info!(seed = %seed_id, pool, kept = mix.len(), "mix.round.done");

        if mix.is_empty() {
            RoundOutcome::Stop(StopReason::NoTrend(self.cfg.min_trend_len))
        } else {
            RoundOutcome::Mixed(mix)
        }
    }

    /// Runs rounds from `picked` until a round stops or the user declines
    /// to continue. Messages and mixes are written to `out`.
    pub async fn run<R: BufRead, W: Write>(
        &self,
        picked: &TrackStub,
        input: &mut R,
        out: &mut W
    ) -> Result<SessionReport, MixError> {
        let Some(first_id) = picked.id.as_deref().filter(|id| !id.is_empty()) else {
            writeln!(out, "Selected track is missing an id.")?;
            return Ok(SessionReport::default());
        };

        let mut report = SessionReport::default();
        let mut seed_id = TrackId(first_id.to_string());
        let mut last: Option<Track> = None;

        loop {
            info!(seed = %seed_id, round = report.rounds + 1, "mix.round.start");
            let from = match &last {
                Some(track) => SeedSource::Chained(track),
                None => SeedSource::Picked(picked)
            };

            let mix = match self.round(&seed_id, from).await {
                RoundOutcome::Mixed(mix) => mix,
                RoundOutcome::Stop(reason) => {
                    writeln!(out, "{reason}")?;
                    report.stop = Some(reason);
                    break;
                }
            };
            report.rounds += 1;
            display_mix(&mix, out)?;

            // a chained round starts with the previous round's last track,
            // unless that track's segment was too short to keep
            let repeats = mix.first()
                .is_some_and(|e| report.urls.last() == Some(&e.track.id.playback_url()));
            let skip = usize::from(repeats);
            report.urls.extend(mix.iter().skip(skip).map(|e| e.track.id.playback_url()));

            let answer = prompt_line("Continue from last track? (y/N): ", input, out)?
                .unwrap_or_default()
                .to_lowercase();
            if answer != "y" && answer != "yes" {
                report.stop = Some(StopReason::UserDone);
                break;
            }

            let Some(tail) = mix.into_iter().last() else { break };
            seed_id = tail.track.id.clone();
            last = Some(tail.track);
        }
        Ok(report)
    }
}
