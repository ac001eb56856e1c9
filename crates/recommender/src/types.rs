//! Result types shared by both recommendation strategies.

use data_loader::MovieName;
use serde::Serialize;

/// A candidate movie with the score a strategy gave it.
///
/// For content-based ranking the score is a cosine similarity; for
/// collaborative filtering it is a predicted rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMovie {
    pub name: MovieName,
    pub score: f64,
}

impl ScoredMovie {
    pub fn new(name: impl Into<MovieName>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// First movie with the strictly greatest score.
///
/// `scored` is expected in movie order, so ties go to the movie that comes
/// first in that order.
pub(crate) fn best_scored(scored: &[ScoredMovie]) -> Option<&ScoredMovie> {
    let mut best: Option<&ScoredMovie> = None;
    for candidate in scored {
        if best.is_none_or(|current| candidate.score > current.score) {
            best = Some(candidate);
        }
    }
    best
}

/// Sort descending by score, keeping movie order among equal scores
pub(crate) fn rank_scored(mut scored: Vec<ScoredMovie>, limit: usize) -> Vec<ScoredMovie> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_scored_prefers_first_on_tie() {
        let scored = vec![
            ScoredMovie::new("A", 0.5),
            ScoredMovie::new("B", 0.9),
            ScoredMovie::new("C", 0.9),
        ];
        assert_eq!(best_scored(&scored).unwrap().name, "B");
        assert!(best_scored(&[]).is_none());
    }

    #[test]
    fn test_rank_scored_is_stable() {
        let scored = vec![
            ScoredMovie::new("A", 0.2),
            ScoredMovie::new("B", 0.7),
            ScoredMovie::new("C", 0.7),
            ScoredMovie::new("D", -0.1),
        ];
        let ranked = rank_scored(scored, 3);
        let names: Vec<&str> = ranked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }
}
