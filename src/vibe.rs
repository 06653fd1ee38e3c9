//!
//! src/vibe.rs  Andrew Belles  Oct 16th, 2026
//!
//! Optional pre-filter keeping candidates whose danceability/energy sit
//! close to the seed's. Runs before sequencing and never reorders.
//!
//!

use crate::types::Track;

#[derive(Debug, Clone, Copy)]
pub struct VibeTolerance {
    pub danceability: f64,
    pub energy: f64
}

impl Default for VibeTolerance {
    fn default() -> Self {
        Self {
            danceability: crate::config::VIBE_DANCEABILITY_TOL,
            energy: crate::config::VIBE_ENERGY_TOL
        }
    }
}

/// A feature missing on either side does not restrict
fn within(seed: Option<f64>, candidate: Option<f64>, tol: f64) -> bool {
    match (seed, candidate) {
        (Some(s), Some(c)) => (s - c).abs() <= tol,
        _ => true
    }
}

pub fn filter_by_vibe(candidates: Vec<Track>, seed: &Track, tol: VibeTolerance) -> Vec<Track> {
    if seed.danceability.is_none() && seed.energy.is_none() {
        return candidates;
    }

    candidates.into_iter()
        .filter(|t| {
            within(seed.danceability, t.danceability, tol.danceability)
                && within(seed.energy, t.energy, tol.energy)
        })
        .collect()
}
