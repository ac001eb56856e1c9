//! Item-based collaborative filtering.
//!
//! Predicts how a user would rate a movie from the ratings they gave to the
//! `k` movies they rated that are most similar to it in attribute space.
//!
//! ## Algorithm
//! 1. For every movie the user rated, compute its cosine similarity to the
//!    target movie
//! 2. Keep the `k` most similar in a bounded min-heap: a candidate evicts the
//!    current weakest neighbor only if its similarity is strictly greater
//! 3. Predict `sum(sim * rating) / sum(sim)` over the kept neighbors. The
//!    prediction is undefined only when `|sum(sim)|` is below `f64::EPSILON`;
//!    positive and negative similarities that nearly cancel still yield a
//!    prediction, possibly far outside the rating scale
//!
//! Selection is `O(rated * log k)`. Among equal similarities the neighbor
//! seen first in movie order is kept, so results are deterministic.

use crate::error::{RecommendError, Result};
use crate::types::{ScoredMovie, best_scored, rank_scored};
use crate::vector_math::cosine_similarity;
use data_loader::{DataIndex, MovieName, UserRatings};
use rayon::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A rated movie selected to inform a prediction
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    /// Position in movie order
    pub position: usize,
    pub similarity: f64,
    pub rating: f64,
}

// Ordered by similarity; among equal similarities the later position is
// "smaller", so a min-heap evicts the most recently seen one first.
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.similarity
            .total_cmp(&other.similarity)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

/// Collaborative filter over a shared, read-only data index
#[derive(Clone)]
pub struct CollaborativeFilter {
    data_index: Arc<DataIndex>,
}

impl CollaborativeFilter {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self { data_index }
    }

    /// Predict the rating `user` would give `movie` from its `k` nearest
    /// rated movies.
    ///
    /// If the user rated fewer than `k` movies, all of them are used.
    #[instrument(skip(self))]
    pub fn predict_rating(&self, movie: &str, user: &str, k: usize) -> Result<f64> {
        let ratings = self.user_ratings(user)?;
        let position = self
            .data_index
            .movie_position(movie)
            .ok_or_else(|| RecommendError::MovieNotFound {
                movie: movie.to_string(),
            })?;
        check_neighborhood(k)?;

        self.predict_at(ratings, position, k)
            .ok_or_else(|| RecommendError::UndefinedPrediction {
                movie: movie.to_string(),
                user: user.to_string(),
            })
    }

    /// The unrated movie with the greatest predicted rating.
    ///
    /// Ties go to the movie that comes first in movie order. Movies whose
    /// prediction is undefined are skipped.
    #[instrument(skip(self))]
    pub fn recommend(&self, user: &str, k: usize) -> Result<MovieName> {
        let predicted = self.predict_unrated(user, k)?;
        best_scored(&predicted)
            .map(|best| best.name.clone())
            .ok_or_else(|| RecommendError::NoCandidateMovies {
                user: user.to_string(),
            })
    }

    /// Up to `limit` unrated movies, highest predicted rating first
    #[instrument(skip(self))]
    pub fn rank(&self, user: &str, k: usize, limit: usize) -> Result<Vec<ScoredMovie>> {
        let predicted = self.predict_unrated(user, k)?;
        Ok(rank_scored(predicted, limit))
    }

    /// The `k` rated movies most similar to the movie at `target`, in movie order
    pub fn nearest_rated(&self, ratings: &UserRatings, target: usize, k: usize) -> Vec<Neighbor> {
        let movies = self.data_index.movies();
        let target_attributes = &movies[target].attributes;
        let mut heap: BinaryHeap<Reverse<Neighbor>> = BinaryHeap::with_capacity(k.min(movies.len()));

        for (position, rating) in ratings.rated() {
            let Some(similarity) = cosine_similarity(&movies[position].attributes, target_attributes)
            else {
                continue;
            };
            let candidate = Neighbor {
                position,
                similarity,
                rating,
            };

            if heap.len() < k {
                heap.push(Reverse(candidate));
            } else if heap
                .peek()
                .is_some_and(|Reverse(weakest)| similarity > weakest.similarity)
            {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }

        let mut neighbors: Vec<Neighbor> = heap.into_iter().map(|Reverse(n)| n).collect();
        neighbors.sort_unstable_by_key(|n| n.position);
        neighbors
    }

    fn predict_at(&self, ratings: &UserRatings, target: usize, k: usize) -> Option<f64> {
        let neighbors = self.nearest_rated(ratings, target, k);
        weighted_average(&neighbors)
    }

    /// Predicted rating of every predictable unrated movie, in movie order
    fn predict_unrated(&self, user: &str, k: usize) -> Result<Vec<ScoredMovie>> {
        let ratings = self.user_ratings(user)?;
        check_neighborhood(k)?;

        let unrated: Vec<usize> = ratings.unrated_positions().collect();
        if unrated.is_empty() {
            return Err(RecommendError::NoCandidateMovies {
                user: user.to_string(),
            });
        }

        let movies = self.data_index.movies();
        let predicted: Vec<ScoredMovie> = unrated
            .par_iter()
            .filter_map(|&pos| {
                self.predict_at(ratings, pos, k)
                    .map(|rating| ScoredMovie::new(movies[pos].name.clone(), rating))
            })
            .collect();

        debug!(
            "Predicted {} of {} unrated movies for {} (k = {})",
            predicted.len(),
            unrated.len(),
            user,
            k
        );
        Ok(predicted)
    }

    fn user_ratings(&self, user: &str) -> Result<&UserRatings> {
        self.data_index
            .get_user_ratings(user)
            .ok_or_else(|| RecommendError::UserNotFound {
                user: user.to_string(),
            })
    }
}

fn check_neighborhood(k: usize) -> Result<()> {
    if k == 0 {
        return Err(RecommendError::InvalidNeighborhood { k });
    }
    Ok(())
}

/// Similarity-weighted mean rating; `None` without neighbors or when the
/// summed similarity is within `f64::EPSILON` of zero
fn weighted_average(neighbors: &[Neighbor]) -> Option<f64> {
    if neighbors.is_empty() {
        return None;
    }

    let (weighted_sum, weight) = neighbors.iter().fold((0.0, 0.0), |(num, den), n| {
        (num + n.similarity * n.rating, den + n.similarity)
    });

    if weight.abs() < f64::EPSILON {
        return None;
    }
    Some(weighted_sum / weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Catalog, Movie, RatingMatrix};

    fn create_test_index() -> DataIndex {
        let mut catalog = Catalog::new();
        catalog.insert_movie(Movie::new("A", vec![1.0, 0.0])).unwrap();
        catalog.insert_movie(Movie::new("B", vec![0.0, 1.0])).unwrap();
        catalog.insert_movie(Movie::new("C", vec![1.0, 1.0])).unwrap();
        catalog.insert_movie(Movie::new("D", vec![3.0, 1.0])).unwrap();

        let order = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let mut ratings = RatingMatrix::new(order);
        ratings
            .insert_user(UserRatings::new("u2", vec![Some(4.0), Some(2.0), None, None]))
            .unwrap();
        ratings
            .insert_user(UserRatings::new("only_b", vec![None, Some(3.0), None, None]))
            .unwrap();
        ratings
            .insert_user(UserRatings::new("nothing", vec![None, None, None, None]))
            .unwrap();
        ratings
            .insert_user(UserRatings::new(
                "full",
                vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            ))
            .unwrap();

        DataIndex::from_parts(catalog, ratings).unwrap()
    }

    fn filter() -> CollaborativeFilter {
        CollaborativeFilter::new(Arc::new(create_test_index()))
    }

    #[test]
    fn test_predict_weighted_average() {
        // sim(A, C) = sim(B, C) = 1/sqrt(2) -> (4 + 2) / 2
        let prediction = filter().predict_rating("C", "u2", 2).unwrap();
        assert!((prediction - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_uses_top_k_only() {
        // D = [3, 1]: A is the nearest rated movie, so k = 1 uses only A
        let prediction = filter().predict_rating("D", "u2", 1).unwrap();
        assert_eq!(prediction, 4.0);
    }

    #[test]
    fn test_k_larger_than_rated_uses_all() {
        let cf = filter();
        let exact = cf.predict_rating("D", "u2", 2).unwrap();
        for k in [3, 10, 100] {
            assert_eq!(cf.predict_rating("D", "u2", k).unwrap(), exact);
        }
    }

    #[test]
    fn test_orthogonal_neighbors_are_undefined() {
        // only_b rated B, orthogonal to A: zero total weight
        assert_eq!(
            filter().predict_rating("A", "only_b", 3).unwrap_err(),
            RecommendError::UndefinedPrediction {
                movie: "A".to_string(),
                user: "only_b".to_string(),
            }
        );
    }

    #[test]
    fn test_no_rated_movies_is_undefined() {
        assert!(matches!(
            filter().predict_rating("A", "nothing", 3),
            Err(RecommendError::UndefinedPrediction { .. })
        ));
    }

    #[test]
    fn test_predict_lookup_errors() {
        let cf = filter();
        assert!(matches!(
            cf.predict_rating("nonexistent-movie", "u2", 3),
            Err(RecommendError::MovieNotFound { .. })
        ));
        assert!(matches!(
            cf.predict_rating("A", "ghost", 3),
            Err(RecommendError::UserNotFound { .. })
        ));
        assert_eq!(
            cf.predict_rating("A", "u2", 0).unwrap_err(),
            RecommendError::InvalidNeighborhood { k: 0 }
        );
    }

    #[test]
    fn test_nearest_rated_tie_keeps_first_seen() {
        let index = Arc::new(create_test_index());
        let cf = CollaborativeFilter::new(index.clone());
        let row = index.get_user_ratings("u2").unwrap();
        let target = index.movie_position("C").unwrap();

        // A and B tie against C; with room for one, A (seen first) stays
        let neighbors = cf.nearest_rated(row, target, 1);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].position, 0);
    }

    #[test]
    fn test_nearest_rated_evicts_latest_equal_minimum() {
        let mut catalog = Catalog::new();
        catalog.insert_movie(Movie::new("X", vec![1.0, 1.0])).unwrap();
        catalog.insert_movie(Movie::new("Y", vec![2.0, 2.0])).unwrap();
        catalog.insert_movie(Movie::new("Z", vec![1.0, 0.1])).unwrap();
        catalog.insert_movie(Movie::new("T", vec![1.0, 0.0])).unwrap();

        let order = ["X", "Y", "Z", "T"].iter().map(|s| s.to_string()).collect();
        let mut ratings = RatingMatrix::new(order);
        ratings
            .insert_user(UserRatings::new("u", vec![Some(3.0), Some(1.0), Some(2.0), None]))
            .unwrap();
        let index = Arc::new(DataIndex::from_parts(catalog, ratings).unwrap());
        let cf = CollaborativeFilter::new(index.clone());
        let row = index.get_user_ratings("u").unwrap();

        // X and Y tie at the minimum against T; Z pushes out Y, seen later
        let neighbors = cf.nearest_rated(row, 3, 2);
        let positions: Vec<usize> = neighbors.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![0, 2]);

        let expected = weighted_average(&neighbors).unwrap();
        assert_eq!(cf.predict_rating("T", "u", 2).unwrap(), expected);
        assert!(neighbors.iter().all(|n| n.rating != 1.0));
    }

    #[test]
    fn test_cancelling_similarities_are_undefined() {
        let mut catalog = Catalog::new();
        catalog.insert_movie(Movie::new("P", vec![1.0, 1.0])).unwrap();
        catalog.insert_movie(Movie::new("N", vec![-1.0, 1.0])).unwrap();
        catalog.insert_movie(Movie::new("T", vec![1.0, 0.0])).unwrap();

        let order = ["P", "N", "T"].iter().map(|s| s.to_string()).collect();
        let mut ratings = RatingMatrix::new(order);
        ratings
            .insert_user(UserRatings::new("u", vec![Some(5.0), Some(1.0), None]))
            .unwrap();
        let cf = CollaborativeFilter::new(Arc::new(DataIndex::from_parts(catalog, ratings).unwrap()));

        // +1/sqrt(2) and -1/sqrt(2) sum to zero weight
        assert!(matches!(
            cf.predict_rating("T", "u", 2),
            Err(RecommendError::UndefinedPrediction { .. })
        ));
    }

    #[test]
    fn test_recommend() {
        let cf = filter();
        // C predicts 3.0, D leans toward A and predicts higher
        assert_eq!(cf.recommend("u2", 2).unwrap(), "D");

        let ranked = cf.rank("u2", 2, 10).unwrap();
        let names: Vec<&str> = ranked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["D", "C"]);
    }

    #[test]
    fn test_recommend_skips_undefined_predictions() {
        // only_b: A is undefined (orthogonal), C and D are predictable
        let ranked = filter().rank("only_b", 1, 10).unwrap();
        assert!(ranked.iter().all(|s| s.name != "A" && s.name != "B"));
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_recommend_errors() {
        let cf = filter();
        assert!(matches!(
            cf.recommend("full", 2),
            Err(RecommendError::NoCandidateMovies { .. })
        ));
        assert!(matches!(
            cf.recommend("nothing", 2),
            Err(RecommendError::NoCandidateMovies { .. })
        ));
        assert!(matches!(
            cf.recommend("ghost", 2),
            Err(RecommendError::UserNotFound { .. })
        ));
    }
}
