//! # Recommender
//!
//! Single entry point over both strategies. Holds the loaded data index and
//! answers read-only queries; clones are cheap and share the index.

use std::sync::Arc;
use std::time::Instant;

use data_loader::{DataIndex, MovieName};
use tracing::info;

use crate::collaborative::CollaborativeFilter;
use crate::content::ContentRecommender;
use crate::error::Result;
use crate::preference::{PreferenceProfile, build_preference_profile};
use crate::types::ScoredMovie;

#[derive(Clone)]
pub struct Recommender {
    data_index: Arc<DataIndex>,
    content: ContentRecommender,
    collaborative: CollaborativeFilter,
}

impl Recommender {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self {
            content: ContentRecommender::new(data_index.clone()),
            collaborative: CollaborativeFilter::new(data_index.clone()),
            data_index,
        }
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    /// Content-based recommendation for `user`
    pub fn recommend_by_content(&self, user: &str) -> Result<MovieName> {
        let start = Instant::now();
        let movie = self.content.recommend(user)?;
        info!(
            "Content recommendation for {}: {} ({:?})",
            user,
            movie,
            start.elapsed()
        );
        Ok(movie)
    }

    /// Content-based ranking of up to `limit` unrated movies
    pub fn rank_by_content(&self, user: &str, limit: usize) -> Result<Vec<ScoredMovie>> {
        self.content.rank(user, limit)
    }

    /// Predicted rating of `movie` by `user` from `k` neighbors
    pub fn predict_rating(&self, movie: &str, user: &str, k: usize) -> Result<f64> {
        self.collaborative.predict_rating(movie, user, k)
    }

    /// Collaborative-filtering recommendation for `user`
    pub fn recommend_by_collaborative_filtering(&self, user: &str, k: usize) -> Result<MovieName> {
        let start = Instant::now();
        let movie = self.collaborative.recommend(user, k)?;
        info!(
            "Collaborative filtering recommendation for {} (k = {}): {} ({:?})",
            user,
            k,
            movie,
            start.elapsed()
        );
        Ok(movie)
    }

    /// Collaborative-filtering ranking of up to `limit` unrated movies
    pub fn rank_by_collaborative_filtering(
        &self,
        user: &str,
        k: usize,
        limit: usize,
    ) -> Result<Vec<ScoredMovie>> {
        self.collaborative.rank(user, k, limit)
    }

    /// Mean, centered ratings and preference vector of `user`
    pub fn preference_profile(&self, user: &str) -> Result<PreferenceProfile> {
        build_preference_profile(&self.data_index, user)
    }
}
