//! Core domain types for the attribute catalog and rating matrix.
//!
//! Movies and users are identified by name. Ratings are matched to movies
//! positionally: every user row holds one slot per movie, in the movie order
//! taken from the ratings header, and the catalog is stored in that same
//! order once loading completes.

use crate::error::{DataLoadError, Result};
use serde::Serialize;
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique movie name, as written in both input files
pub type MovieName = String;

/// Unique user name, first token of each ratings row
pub type UserName = String;

/// Fixed-length feature vector describing a movie
pub type AttributeVector = Vec<f64>;

/// A single rating slot: `None` means the user has not rated the movie
pub type RatingSlot = Option<f64>;

// =============================================================================
// Catalog
// =============================================================================

/// A movie and its attribute vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub name: MovieName,
    pub attributes: AttributeVector,
}

impl Movie {
    pub fn new(name: impl Into<MovieName>, attributes: AttributeVector) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }
}

/// Every movie's attribute vector, with O(1) lookup by name.
///
/// All vectors share one length, fixed by the first inserted movie.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
    positions: HashMap<MovieName, usize>,
    num_attributes: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a movie, enforcing a unique name and a consistent dimension
    pub fn insert_movie(&mut self, movie: Movie) -> Result<()> {
        if self.positions.contains_key(&movie.name) {
            return Err(DataLoadError::DuplicateEntry {
                entity: "movie".to_string(),
                name: movie.name,
            });
        }

        if self.movies.is_empty() {
            self.num_attributes = movie.attributes.len();
        } else if movie.attributes.len() != self.num_attributes {
            return Err(DataLoadError::InvalidAttributeDimension {
                movie: movie.name,
                expected: self.num_attributes,
                found: movie.attributes.len(),
            });
        }

        self.positions.insert(movie.name.clone(), self.movies.len());
        self.movies.push(movie);
        Ok(())
    }

    pub fn get_movie(&self, name: &str) -> Option<&Movie> {
        self.positions.get(name).map(|&pos| &self.movies[pos])
    }

    /// Position of a movie in the catalog's current order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn num_attributes(&self) -> usize {
        self.num_attributes
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Rearrange the catalog so that `movies()[i]` is `order[i]`.
    ///
    /// The order must name every catalog movie exactly once.
    pub fn reorder(&mut self, order: &[MovieName]) -> Result<()> {
        let mut slots: Vec<Option<Movie>> = std::mem::take(&mut self.movies)
            .into_iter()
            .map(Some)
            .collect();
        let mut reordered = Vec::with_capacity(order.len());

        for name in order {
            let movie = self
                .positions
                .get(name)
                .and_then(|&pos| slots[pos].take())
                .ok_or_else(|| DataLoadError::MissingReference {
                    entity: "attributes for movie".to_string(),
                    name: name.clone(),
                })?;
            reordered.push(movie);
        }

        // Anything left over has attributes but no ratings column
        if let Some(orphan) = slots.into_iter().flatten().next() {
            return Err(DataLoadError::MissingReference {
                entity: "ratings column for movie".to_string(),
                name: orphan.name,
            });
        }

        self.positions = reordered
            .iter()
            .enumerate()
            .map(|(pos, movie)| (movie.name.clone(), pos))
            .collect();
        self.movies = reordered;
        Ok(())
    }
}

// =============================================================================
// Rating Matrix
// =============================================================================

/// One user's ratings, one slot per movie in movie order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRatings {
    pub user: UserName,
    pub ratings: Vec<RatingSlot>,
}

impl UserRatings {
    pub fn new(user: impl Into<UserName>, ratings: Vec<RatingSlot>) -> Self {
        Self {
            user: user.into(),
            ratings,
        }
    }

    /// Rating at a movie position, `None` if unrated
    pub fn rating_at(&self, position: usize) -> RatingSlot {
        self.ratings.get(position).copied().flatten()
    }

    pub fn is_rated(&self, position: usize) -> bool {
        self.rating_at(position).is_some()
    }

    /// `(position, rating)` for every rated movie, in movie order
    pub fn rated(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.ratings
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| slot.map(|r| (pos, r)))
    }

    /// Positions of every unrated movie, in movie order
    pub fn unrated_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.ratings
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(pos, _)| pos)
    }

    pub fn rated_count(&self) -> usize {
        self.ratings.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Dense user x movie matrix keyed by user name.
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    movie_order: Vec<MovieName>,
    users: HashMap<UserName, UserRatings>,
    /// Users in file order, for stable listing
    user_order: Vec<UserName>,
}

impl RatingMatrix {
    pub fn new(movie_order: Vec<MovieName>) -> Self {
        Self {
            movie_order,
            users: HashMap::new(),
            user_order: Vec::new(),
        }
    }

    /// Insert a user's row; the row must cover the whole movie order
    pub fn insert_user(&mut self, row: UserRatings) -> Result<()> {
        if row.ratings.len() != self.movie_order.len() {
            return Err(DataLoadError::ValidationError(format!(
                "user {} has {} rating slots, expected {}",
                row.user,
                row.ratings.len(),
                self.movie_order.len()
            )));
        }
        if self.users.contains_key(&row.user) {
            return Err(DataLoadError::DuplicateEntry {
                entity: "user".to_string(),
                name: row.user,
            });
        }

        self.user_order.push(row.user.clone());
        self.users.insert(row.user.clone(), row);
        Ok(())
    }

    pub fn movie_order(&self) -> &[MovieName] {
        &self.movie_order
    }

    pub fn get_user(&self, name: &str) -> Option<&UserRatings> {
        self.users.get(name)
    }

    pub fn user_names(&self) -> &[UserName] {
        &self.user_order
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// =============================================================================
// DataIndex - The Core In-Memory Database
// =============================================================================

/// Catalog and rating matrix, aligned on one movie order.
///
/// Built once at load time and read-only afterwards, so it can be shared
/// across threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct DataIndex {
    pub(crate) catalog: Catalog,
    pub(crate) ratings: RatingMatrix,
}

impl DataIndex {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ratings(&self) -> &RatingMatrix {
        &self.ratings
    }

    /// Authoritative movie order (ratings header order)
    pub fn movie_order(&self) -> &[MovieName] {
        self.ratings.movie_order()
    }

    /// Movies in movie order; index `i` matches rating slot `i`
    pub fn movies(&self) -> &[Movie] {
        self.catalog.movies()
    }

    pub fn get_movie(&self, name: &str) -> Option<&Movie> {
        self.catalog.get_movie(name)
    }

    pub fn movie_position(&self, name: &str) -> Option<usize> {
        self.catalog.position(name)
    }

    pub fn get_user_ratings(&self, user: &str) -> Option<&UserRatings> {
        self.ratings.get_user(user)
    }

    pub fn user_names(&self) -> &[UserName] {
        self.ratings.user_names()
    }

    pub fn num_attributes(&self) -> usize {
        self.catalog.num_attributes()
    }

    /// Get counts for debugging/validation: (users, movies, rated slots)
    pub fn counts(&self) -> (usize, usize, usize) {
        let rated = self
            .user_names()
            .iter()
            .filter_map(|name| self.ratings.get_user(name))
            .map(|row| row.rated_count())
            .sum();
        (self.ratings.len(), self.catalog.len(), rated)
    }
}
