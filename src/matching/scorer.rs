use super::Candidate;
use super::normalize::normalize;
use super::similarity::{partial_ratio, token_sort_ratio};

/// Relative weight of each similarity component.
///
/// Order: artist full, artist partial, album full, album partial, title full,
/// title partial. The raw values add up to 1.1, so they are divided by their
/// sum before use and the applied weights add up to exactly 1.0.
pub const RELATIVE_WEIGHTS: [f64; 6] = [0.3, 0.2, 0.2, 0.1, 0.2, 0.1];

const TEXT_SHARE: f64 = 0.8;
const DURATION_SHARE: f64 = 0.2;

/// The weights actually applied by [`text_score`].
pub fn applied_weights() -> [f64; 6] {
    let total: f64 = RELATIVE_WEIGHTS.iter().sum();
    RELATIVE_WEIGHTS.map(|weight| weight / total)
}

/// Weighted title/artist/album similarity, 0-100. Inputs are raw names.
pub fn text_score(
    candidate_title: &str,
    candidate_artist: &str,
    candidate_album: &str,
    remote_title: &str,
    remote_artist: &str,
    remote_album: &str,
) -> f64 {
    let pairs = [
        (normalize(candidate_artist), normalize(remote_artist)),
        (normalize(candidate_album), normalize(remote_album)),
        (normalize(candidate_title), normalize(remote_title)),
    ];

    let components = pairs.iter().flat_map(|(local, remote)| {
        [token_sort_ratio(local, remote), partial_ratio(local, remote)]
    });

    let score: f64 = components
        .zip(applied_weights())
        .map(|(similarity, weight)| similarity * weight)
        .sum();

    score.clamp(0.0, 100.0)
}

/// Duration proximity, 0-100. `None` when either side is missing or both are
/// zero.
pub fn duration_similarity(candidate_ms: Option<u64>, remote_ms: Option<u64>) -> Option<f64> {
    let (candidate_ms, remote_ms) = (candidate_ms?, remote_ms?);
    let longest = candidate_ms.max(remote_ms);
    if longest == 0 {
        return None;
    }
    let difference = candidate_ms.abs_diff(remote_ms) as f64;
    Some((100.0 - difference / longest as f64 * 100.0).max(0.0))
}

/// Score a library candidate against a remote track's fields, 0-100.
pub fn score<C: Candidate + ?Sized>(
    candidate: &C,
    remote_title: &str,
    remote_artist: &str,
    remote_album: &str,
    remote_duration_ms: Option<u64>,
) -> f64 {
    let text = text_score(
        candidate.title(),
        candidate.primary_artist(),
        candidate.album(),
        remote_title,
        remote_artist,
        remote_album,
    );

    match duration_similarity(candidate.duration_ms(), remote_duration_ms) {
        Some(duration) => text * TEXT_SHARE + duration * DURATION_SHARE,
        None => text,
    }
}
