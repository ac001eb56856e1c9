//! DataIndex building and validation.
//!
//! Loading happens once: both files are parsed (in parallel), the catalog is
//! rearranged into the ratings header order, and the result is validated
//! before any query can see it.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{debug, info};

impl DataIndex {
    /// Load the attribute and ratings files into an immutable index.
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Align the catalog with the ratings header order
    /// 3. Validate dimensions and ratings
    pub fn load_from_files(attributes_path: &Path, ratings_path: &Path) -> Result<Self> {
        info!(
            "Loading movie attributes from {:?} and ratings from {:?}",
            attributes_path, ratings_path
        );

        let (catalog, ratings) = rayon::join(
            || parser::parse_attributes_file(attributes_path),
            || parser::parse_ratings_file(ratings_path),
        );
        let catalog = catalog?;
        let ratings = ratings?;

        let index = Self::from_parts(catalog, ratings)?;

        let (users, movies, rated) = index.counts();
        info!(
            "Loaded {} users, {} movies ({} attributes each), {} ratings",
            users,
            movies,
            index.num_attributes(),
            rated
        );
        Ok(index)
    }

    /// Build an index from already-parsed tables.
    ///
    /// The catalog is rearranged into the rating matrix's movie order, so both
    /// must name exactly the same movies.
    pub fn from_parts(mut catalog: Catalog, ratings: RatingMatrix) -> Result<Self> {
        catalog.reorder(ratings.movie_order())?;

        let index = Self { catalog, ratings };
        index.validate()?;
        debug!("DataIndex built and validated");
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - every movie vector has `num_attributes` entries
    /// - catalog position `i` is movie-order entry `i`
    /// - every user row has one finite, non-zero slot per movie
    pub fn validate(&self) -> Result<()> {
        let num_attributes = self.catalog.num_attributes();

        for (pos, movie) in self.catalog.movies().iter().enumerate() {
            if movie.attributes.len() != num_attributes {
                return Err(DataLoadError::InvalidAttributeDimension {
                    movie: movie.name.clone(),
                    expected: num_attributes,
                    found: movie.attributes.len(),
                });
            }
            if self.movie_order().get(pos) != Some(&movie.name) {
                return Err(DataLoadError::ValidationError(format!(
                    "movie {} is out of order at position {}",
                    movie.name, pos
                )));
            }
        }

        for name in self.ratings.user_names() {
            let row = self
                .ratings
                .get_user(name)
                .ok_or_else(|| DataLoadError::MissingReference {
                    entity: "user".to_string(),
                    name: name.clone(),
                })?;

            if row.ratings.len() != self.catalog.len() {
                return Err(DataLoadError::FieldCountMismatch {
                    expected: self.catalog.len(),
                    found: row.ratings.len(),
                    line: 0,
                });
            }

            if let Some(bad) = row.ratings.iter().flatten().find(|r| !r.is_finite() || **r == 0.0) {
                return Err(DataLoadError::InvalidValue {
                    field: format!("rating of user {}", row.user),
                    value: bad.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(movies: &[(&str, Vec<f64>)]) -> Catalog {
        let mut catalog = Catalog::new();
        for (name, attrs) in movies {
            catalog.insert_movie(Movie::new(*name, attrs.clone())).unwrap();
        }
        catalog
    }

    #[test]
    fn test_from_parts_reorders_catalog() {
        let catalog = catalog(&[("C", vec![1.0, 1.0]), ("A", vec![1.0, 0.0]), ("B", vec![0.0, 1.0])]);
        let mut ratings = RatingMatrix::new(vec!["A".into(), "B".into(), "C".into()]);
        ratings
            .insert_user(UserRatings::new("u", vec![Some(4.0), None, Some(2.0)]))
            .unwrap();

        let index = DataIndex::from_parts(catalog, ratings).unwrap();

        let names: Vec<&str> = index.movies().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(index.movie_position("C"), Some(2));
        assert_eq!(index.get_movie("A").unwrap().attributes, vec![1.0, 0.0]);
        assert_eq!(index.counts(), (1, 3, 2));
    }

    #[test]
    fn test_header_movie_without_attributes() {
        let catalog = catalog(&[("A", vec![1.0])]);
        let ratings = RatingMatrix::new(vec!["A".into(), "Z".into()]);

        let err = DataIndex::from_parts(catalog, ratings).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingReference { ref name, .. } if name == "Z"));
    }

    #[test]
    fn test_movie_missing_from_header() {
        let catalog = catalog(&[("A", vec![1.0]), ("B", vec![2.0])]);
        let ratings = RatingMatrix::new(vec!["A".into()]);

        let err = DataIndex::from_parts(catalog, ratings).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingReference { ref name, .. } if name == "B"));
    }

    #[test]
    fn test_short_row_rejected_on_insert() {
        let mut ratings = RatingMatrix::new(vec!["A".into(), "B".into()]);
        let err = ratings
            .insert_user(UserRatings::new("u", vec![Some(1.0)]))
            .unwrap_err();
        assert!(matches!(err, DataLoadError::ValidationError(_)));
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let mut ratings = RatingMatrix::new(vec!["A".into()]);
        ratings.insert_user(UserRatings::new("u", vec![Some(1.0)])).unwrap();
        let err = ratings
            .insert_user(UserRatings::new("u", vec![None]))
            .unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicateEntry { .. }));
    }

    #[test]
    fn test_zero_rating_rejected_by_validate() {
        let catalog = catalog(&[("A", vec![1.0])]);
        let mut ratings = RatingMatrix::new(vec!["A".into()]);
        ratings.insert_user(UserRatings::new("u", vec![Some(0.0)])).unwrap();

        let err = DataIndex::from_parts(catalog, ratings).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));
    }
}
