use super::Candidate;
use super::normalize::normalize;
use super::scorer::score;
use super::similarity::ratio;
use crate::ports::spotify::RemoteTrack;

/// Longest list [`rank`] returns.
pub const MAX_RANKED: usize = 10;

/// Averaged similarity a candidate must exceed to be accepted without asking.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// A candidate together with its [`score`].
#[derive(Debug)]
pub struct Ranked<'a, C> {
    pub candidate: &'a C,
    pub score: f64,
}

impl<C> Clone for Ranked<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Ranked<'_, C> {}

/// Order candidates by weighted score, best first, at most [`MAX_RANKED`].
///
/// Candidates whose normalized primary artist differs from the remote
/// track's are dropped outright. Equal scores keep their input order.
pub fn rank<'a, C: Candidate>(candidates: &'a [C], remote: &RemoteTrack) -> Vec<Ranked<'a, C>> {
    let remote_artist = normalize(remote.primary_artist());

    let mut ranked: Vec<Ranked<'a, C>> = candidates
        .iter()
        .filter(|candidate| normalize(candidate.primary_artist()) == remote_artist)
        .map(|candidate| Ranked {
            candidate,
            score: score(
                candidate,
                &remote.title,
                remote.primary_artist(),
                &remote.album,
                remote.duration_ms,
            ),
        })
        .collect();

    // `sort_by` is stable, ties stay in input order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(MAX_RANKED);
    ranked
}

/// Pick the candidate whose plain title/artist/album similarity average is
/// highest, if that average exceeds `threshold`.
///
/// Unlike [`rank`] this uses the raw names, no partial matching, no duration
/// and no artist filter. `None` means the operator has to decide.
pub fn match_one<'a, C: Candidate>(
    candidates: &'a [C],
    remote: &RemoteTrack,
    threshold: f64,
) -> Option<&'a C> {
    let mut best: Option<(&'a C, f64)> = None;

    for candidate in candidates {
        let average = (ratio(&remote.title, candidate.title())
            + ratio(remote.primary_artist(), candidate.primary_artist())
            + ratio(&remote.album, candidate.album()))
            / 3.0;

        if average > threshold && best.is_none_or(|(_, best_average)| average > best_average) {
            best = Some((candidate, average));
        }
    }

    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{plex_track, remote_track};

    fn yesterday() -> RemoteTrack {
        remote_track("sp-1", "Yesterday", &["The Beatles"], "Help!", Some(125_000))
    }

    #[test]
    fn test_match_one_picks_studio_version() {
        let candidates = vec![
            plex_track("101", "Yesterday", "The Beatles", "Help!", Some(126_000)),
            plex_track("102", "Yesterday (Live)", "The Beatles", "Anthology", Some(130_000)),
        ];

        let matched = match_one(&candidates, &yesterday(), DEFAULT_THRESHOLD);
        assert_eq!(matched.map(|c| c.rating_key.as_str()), Some("101"));
    }

    #[test]
    fn test_match_one_prefers_higher_average_regardless_of_order() {
        let candidates = vec![
            plex_track("102", "Yesterday!", "The Beatles", "Help!", None),
            plex_track("101", "Yesterday", "The Beatles", "Help!", None),
        ];

        let matched = match_one(&candidates, &yesterday(), DEFAULT_THRESHOLD);
        assert_eq!(matched.map(|c| c.rating_key.as_str()), Some("101"));
    }

    #[test]
    fn test_match_one_below_threshold_is_none() {
        let candidates = vec![plex_track(
            "102",
            "Yesterday (Live)",
            "The Beatles",
            "Anthology",
            Some(130_000),
        )];

        assert!(match_one(&candidates, &yesterday(), DEFAULT_THRESHOLD).is_none());
    }

    #[test]
    fn test_match_one_threshold_is_exclusive() {
        let candidates = vec![plex_track("101", "Yesterday", "The Beatles", "Help!", None)];
        assert!(match_one(&candidates, &yesterday(), 100.0).is_none());
        assert!(match_one(&candidates, &yesterday(), 99.0).is_some());
    }

    #[test]
    fn test_match_one_ignores_duration_and_artist_filter() {
        // Wrong duration and a differently spelled artist still average high
        let candidates = vec![plex_track("101", "Yesterday", "The Beatles.", "Help!", Some(1))];
        assert!(match_one(&candidates, &yesterday(), DEFAULT_THRESHOLD).is_some());
    }

    #[test]
    fn test_empty_candidates() {
        let candidates: Vec<crate::plex_rs::track::PlexTrack> = Vec::new();
        assert!(rank(&candidates, &yesterday()).is_empty());
        assert!(match_one(&candidates, &yesterday(), DEFAULT_THRESHOLD).is_none());
    }

    #[test]
    fn test_rank_orders_best_first() {
        let candidates = vec![
            plex_track("102", "Yesterday (Live)", "The Beatles", "Anthology", Some(130_000)),
            plex_track("101", "Yesterday", "The Beatles", "Help!", Some(126_000)),
        ];

        let ranked = rank(&candidates, &yesterday());
        let keys: Vec<&str> = ranked.iter().map(|r| r.candidate.rating_key.as_str()).collect();
        assert_eq!(keys, vec!["101", "102"]);
        assert!(ranked[0].score >= ranked[1].score);
    }

    #[test]
    fn test_rank_drops_other_artists() {
        let candidates = vec![
            plex_track("201", "Yesterday", "Ray Charles", "Help!", Some(125_000)),
            plex_track("202", "Something Else", "The Beatles", "Abbey Road", Some(180_000)),
            plex_track("203", "Yesterday", "Beatles", "Help!", Some(125_000)),
        ];

        let ranked = rank(&candidates, &yesterday());
        let keys: Vec<&str> = ranked.iter().map(|r| r.candidate.rating_key.as_str()).collect();
        assert_eq!(keys, vec!["202"]);
    }

    #[test]
    fn test_rank_artist_filter_uses_normalized_names() {
        let candidates = vec![plex_track(
            "301",
            "Yesterday",
            "THE BEATLES (UK)",
            "Help!",
            None,
        )];
        assert_eq!(rank(&candidates, &yesterday()).len(), 1);
    }

    #[test]
    fn test_rank_is_stable_for_equal_scores() {
        let candidates = vec![
            plex_track("a", "Yesterday", "The Beatles", "Help!", Some(125_000)),
            plex_track("b", "Yesterday", "The Beatles", "Help!", Some(125_000)),
            plex_track("c", "Yesterday", "The Beatles", "Help!", Some(125_000)),
        ];

        let ranked = rank(&candidates, &yesterday());
        let keys: Vec<&str> = ranked.iter().map(|r| r.candidate.rating_key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_truncates_to_ten() {
        let candidates: Vec<_> = (0..25)
            .map(|i| {
                plex_track(
                    &i.to_string(),
                    &format!("Yesterday {}", i),
                    "The Beatles",
                    "Help!",
                    Some(125_000),
                )
            })
            .collect();

        assert_eq!(rank(&candidates, &yesterday()).len(), MAX_RANKED);
    }
}
