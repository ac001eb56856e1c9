//! # Recommender Crate
//!
//! Movie recommendation over a loaded [`data_loader::DataIndex`].
//!
//! ## Components
//!
//! ### Content-based
//! Builds a preference vector from the user's mean-centered ratings and
//! recommends the unrated movie whose attributes point the same way.
//!
//! ### Collaborative filtering (item-based)
//! Predicts a rating for an unrated movie from the user's ratings of the `k`
//! most similar movies they rated, weighted by similarity.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use recommender::Recommender;
//! use std::sync::Arc;
//!
//! let index = Arc::new(DataIndex::load_from_files(attributes, ratings)?);
//! let recommender = Recommender::new(index);
//!
//! let by_content = recommender.recommend_by_content("Sofia")?;
//! let predicted = recommender.predict_rating("Inception", "Sofia", 3)?;
//! let by_cf = recommender.recommend_by_collaborative_filtering("Sofia", 3)?;
//! ```
//!
//! Every query is a pure read, so a `Recommender` can be cloned into as many
//! threads as needed.

pub mod error;
pub mod vector_math;
pub mod preference;
pub mod types;
pub mod content;
pub mod collaborative;
pub mod engine;

pub use collaborative::{CollaborativeFilter, Neighbor};
pub use content::ContentRecommender;
pub use engine::Recommender;
pub use error::{RecommendError, Result};
pub use preference::{CenteredRatings, PreferenceProfile};
pub use types::ScoredMovie;
