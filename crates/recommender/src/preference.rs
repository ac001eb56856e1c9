//! Preference model: a user's taste expressed as a vector in attribute space.
//!
//! ## Algorithm
//! 1. Center the user's ratings on their mean rating
//! 2. Sum each rated movie's attribute vector, weighted by its centered rating
//!
//! Movies rated above the mean pull the vector toward their attributes,
//! movies rated below push it away.

use crate::error::{RecommendError, Result};
use data_loader::{AttributeVector, DataIndex, RatingSlot, UserName, UserRatings};
use serde::Serialize;
use tracing::debug;

/// A user's ratings with their mean subtracted.
///
/// Unrated slots stay `None`. A movie rated exactly at the mean becomes
/// `Some(0.0)` and contributes nothing to the preference vector.
#[derive(Debug, Clone, PartialEq)]
pub struct CenteredRatings {
    pub mean: f64,
    pub slots: Vec<RatingSlot>,
}

/// Everything derived from one user's ratings for content-based ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceProfile {
    pub user: UserName,
    pub mean: f64,
    pub centered: Vec<RatingSlot>,
    pub vector: AttributeVector,
}

/// Subtract the user's mean rating from every rated slot.
///
/// Fails with `NoRatings` when the user rated nothing, since the mean is
/// undefined.
pub fn center_ratings(ratings: &UserRatings) -> Result<CenteredRatings> {
    let (sum, count) = ratings
        .rated()
        .fold((0.0, 0usize), |(sum, count), (_, r)| (sum + r, count + 1));

    if count == 0 {
        return Err(RecommendError::NoRatings {
            user: ratings.user.clone(),
        });
    }

    let mean = sum / count as f64;
    let slots = ratings
        .ratings
        .iter()
        .map(|slot| slot.map(|r| r - mean))
        .collect();

    Ok(CenteredRatings { mean, slots })
}

/// Accumulate `centered * attributes` over every movie with a non-zero
/// centered rating
pub fn build_preference_vector(data_index: &DataIndex, centered: &CenteredRatings) -> AttributeVector {
    let mut vector = vec![0.0; data_index.num_attributes()];

    for (movie, slot) in data_index.movies().iter().zip(&centered.slots) {
        let weight = match slot {
            Some(w) if *w != 0.0 => *w,
            _ => continue,
        };
        for (acc, attr) in vector.iter_mut().zip(&movie.attributes) {
            *acc += weight * attr;
        }
    }

    vector
}

/// Build the full preference profile of `user`
pub fn build_preference_profile(data_index: &DataIndex, user: &str) -> Result<PreferenceProfile> {
    let ratings = data_index
        .get_user_ratings(user)
        .ok_or_else(|| RecommendError::UserNotFound {
            user: user.to_string(),
        })?;

    let centered = center_ratings(ratings)?;
    let vector = build_preference_vector(data_index, &centered);
    debug!(
        "Preference vector for {}: mean {:.3}, vector {:?}",
        user, centered.mean, vector
    );

    Ok(PreferenceProfile {
        user: ratings.user.clone(),
        mean: centered.mean,
        centered: centered.slots,
        vector,
    })
}
