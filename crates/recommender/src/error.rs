//! Error types for recommendation queries.
//!
//! Every failure is a named variant: no query ever signals an error through
//! a number that could also be a valid score or rating.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Query references a user absent from the rating matrix
    #[error("User {user} not found")]
    UserNotFound { user: String },

    /// Query references a movie absent from the catalog
    #[error("Movie {movie} not found")]
    MovieNotFound { movie: String },

    /// The weighted average has no weight behind it (no usable neighbor,
    /// or similarities summing to zero)
    #[error("Cannot predict a rating of {movie} for {user}: no similarity signal")]
    UndefinedPrediction { movie: String, user: String },

    /// Nothing left to recommend
    #[error("No candidate movie to recommend to {user}")]
    NoCandidateMovies { user: String },

    /// Mean rating is undefined for a user who rated nothing
    #[error("User {user} has not rated any movie")]
    NoRatings { user: String },

    /// Preference vector is all zeros, so its similarity to any movie is undefined
    #[error("Preference vector of {user} is zero (ratings carry no deviation from their mean)")]
    UndefinedPreference { user: String },

    /// Collaborative filtering needs at least one neighbor
    #[error("Neighborhood size must be at least 1, got {k}")]
    InvalidNeighborhood { k: usize },
}

pub type Result<T> = std::result::Result<T, RecommendError>;
