//! Error types for the data-loader crate.
//!
//! Every variant here is fatal to the load step: a `DataIndex` is only
//! handed out once both input files parsed and validated cleanly.

use thiserror::Error;

/// Errors that can occur while loading the attribute and ratings files
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// An input source could not be opened or read
    #[error("Unable to open file {path}: {source}")]
    LoadFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// A movie's attribute vector length disagrees with the established dimension
    #[error("Movie {movie} has {found} attributes, expected {expected}")]
    InvalidAttributeDimension {
        movie: String,
        expected: usize,
        found: usize,
    },

    /// Referenced entity doesn't exist (e.g. a header movie with no attributes)
    #[error("Missing reference: {entity} {name}")]
    MissingReference { entity: String, name: String },

    /// The same movie or user appears twice
    #[error("Duplicate {entity}: {name}")]
    DuplicateEntry { entity: String, name: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
