//! # Data Loader Crate
//!
//! Loads the movie attribute table and the user rating matrix into an
//! immutable [`DataIndex`].
//!
//! ## Main Components
//!
//! - **types**: Catalog, RatingMatrix, UserRatings and DataIndex
//! - **parser**: Parse the two whitespace-separated input files
//! - **index**: Align the tables on one movie order and validate them
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(
//!     Path::new("data/movies_features.txt"),
//!     Path::new("data/ranks_matrix.txt"),
//! )?;
//!
//! let alien = index.get_movie("Alien").unwrap();
//! let ratings = index.get_user_ratings("Sofia").unwrap();
//! println!("Sofia rated {} movies", ratings.rated_count());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use parser::MISSING_MARKER;
pub use types::{
    // Type aliases
    AttributeVector,
    MovieName,
    RatingSlot,
    UserName,
    // Core types
    Catalog,
    DataIndex,
    Movie,
    RatingMatrix,
    UserRatings,
};
