//! Content-based recommendation.
//!
//! Ranks every movie the user has not rated by the cosine similarity between
//! its attribute vector and the user's preference vector.
//!
//! ## Edge policy
//! - a preference vector of zero norm (single rating, or all ratings equal)
//!   fails with `UndefinedPreference`
//! - candidates whose own attribute vector is all zeros are skipped
//! - nothing left to score fails with `NoCandidateMovies`

use crate::error::{RecommendError, Result};
use crate::preference::build_preference_profile;
use crate::types::{ScoredMovie, best_scored, rank_scored};
use crate::vector_math::{cosine_similarity, norm};
use data_loader::{DataIndex, MovieName};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Content-based recommender over a shared, read-only data index
#[derive(Clone)]
pub struct ContentRecommender {
    data_index: Arc<DataIndex>,
}

impl ContentRecommender {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self { data_index }
    }

    /// The unrated movie most similar to the user's preference vector.
    ///
    /// Ties go to the movie that comes first in movie order.
    #[instrument(skip(self))]
    pub fn recommend(&self, user: &str) -> Result<MovieName> {
        let scored = self.score_unrated(user)?;
        best_scored(&scored)
            .map(|best| best.name.clone())
            .ok_or_else(|| RecommendError::NoCandidateMovies {
                user: user.to_string(),
            })
    }

    /// Up to `limit` unrated movies, most similar first
    #[instrument(skip(self))]
    pub fn rank(&self, user: &str, limit: usize) -> Result<Vec<ScoredMovie>> {
        let scored = self.score_unrated(user)?;
        Ok(rank_scored(scored, limit))
    }

    /// Similarity of every scorable unrated movie, in movie order
    fn score_unrated(&self, user: &str) -> Result<Vec<ScoredMovie>> {
        let ratings = self
            .data_index
            .get_user_ratings(user)
            .ok_or_else(|| RecommendError::UserNotFound {
                user: user.to_string(),
            })?;

        let unrated: Vec<usize> = ratings.unrated_positions().collect();
        if unrated.is_empty() {
            return Err(RecommendError::NoCandidateMovies {
                user: user.to_string(),
            });
        }

        let profile = build_preference_profile(&self.data_index, user)?;
        if norm(&profile.vector) == 0.0 {
            return Err(RecommendError::UndefinedPreference {
                user: user.to_string(),
            });
        }

        let movies = self.data_index.movies();
        let scored: Vec<ScoredMovie> = unrated
            .par_iter()
            .filter_map(|&pos| {
                let movie = &movies[pos];
                cosine_similarity(&profile.vector, &movie.attributes)
                    .map(|similarity| ScoredMovie::new(movie.name.clone(), similarity))
            })
            .collect();

        debug!(
            "Scored {} of {} unrated movies for {}",
            scored.len(),
            unrated.len(),
            user
        );

        if scored.is_empty() {
            return Err(RecommendError::NoCandidateMovies {
                user: user.to_string(),
            });
        }
        Ok(scored)
    }
}
