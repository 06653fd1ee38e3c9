//!
//! src/tempo.rs  Andrew Belles  Oct 16th, 2026
//!
//! Tempo compatibility between two tracks, allowing half and double time
//!
//!

/// True if `candidate` is within `tolerance` (relative to the target) of
/// `reference`, `reference * 2` or `reference / 2`. Absent, zero or
/// negative tempos never match.
pub fn bpm_matches(reference: Option<f64>, candidate: Option<f64>, tolerance: f64) -> bool {
    let (Some(reference), Some(candidate)) = (reference, candidate) else {
        return false;
    };
    if !(reference > 0.0 && candidate > 0.0) {
        return false;
    }

    let within = |target: f64| (candidate - target).abs() / target <= tolerance;
    within(reference) || within(reference * 2.0) || within(reference * 0.5)
}

/// Absolute tempo gap used for ranking; unknown tempos rank last
pub fn bpm_gap(a: Option<f64>, b: Option<f64>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs(),
        _ => f64::INFINITY
    }
}
