//! Parsers for the two whitespace-separated input files.
//!
//! - attributes file: `<movie> <attr> <attr> ...`, one movie per line
//! - ratings file: a header line of movie names, then
//!   `<user> <rating|NA> <rating|NA> ...` with one token per header movie
//!
//! Blank lines are skipped in both files. Parse errors carry the file and the
//! 1-based line number they came from.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Token marking a movie the user has not rated
pub const MISSING_MARKER: &str = "NA";

/// Read a whole file, reporting open/read failures as `LoadFailure`
fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| DataLoadError::LoadFailure {
        path: path.display().to_string(),
        source,
    })
}

/// Numbered, trimmed, non-blank lines
fn content_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parse the movie attributes file at `path` into a catalog
pub fn parse_attributes_file(path: &Path) -> Result<Catalog> {
    let content = read_source(path)?;
    parse_attributes(&content, &path.display().to_string())
}

/// Parse attribute lines into a catalog.
///
/// The first movie fixes the attribute dimension; any later movie with a
/// different count fails with `InvalidAttributeDimension`.
pub fn parse_attributes(content: &str, file: &str) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for (line_no, line) in content_lines(content) {
        let mut parts = line.split_whitespace();

        let name = parts.next().ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: "Missing movie name".to_string(),
        })?;

        let attributes = parts
            .map(|token| parse_number(token, file, line_no, "attribute"))
            .collect::<Result<AttributeVector>>()?;

        if attributes.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Missing attributes for movie {}", name),
            });
        }

        catalog.insert_movie(Movie::new(name, attributes))?;
    }

    Ok(catalog)
}

/// Parse the user ratings file at `path` into a rating matrix
pub fn parse_ratings_file(path: &Path) -> Result<RatingMatrix> {
    let content = read_source(path)?;
    parse_ratings(&content, &path.display().to_string())
}

/// Parse a ratings header plus user rows into a rating matrix.
///
/// Ratings are matched to movies by column position in the header.
pub fn parse_ratings(content: &str, file: &str) -> Result<RatingMatrix> {
    let mut lines = content_lines(content);

    let (_, header) = lines.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line: 1,
        reason: "Missing header of movie names".to_string(),
    })?;

    let movie_order: Vec<MovieName> = header.split_whitespace().map(str::to_string).collect();
    let mut seen = HashSet::with_capacity(movie_order.len());
    for name in &movie_order {
        if !seen.insert(name.as_str()) {
            return Err(DataLoadError::DuplicateEntry {
                entity: "movie in ratings header".to_string(),
                name: name.clone(),
            });
        }
    }

    let mut matrix = RatingMatrix::new(movie_order);

    for (line_no, line) in lines {
        let mut parts = line.split_whitespace();

        let user = parts.next().ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: "Missing user name".to_string(),
        })?;

        let ratings = parts
            .map(|token| parse_rating_token(token, file, line_no))
            .collect::<Result<Vec<RatingSlot>>>()?;

        let expected = matrix.movie_order().len();
        if ratings.len() != expected {
            return Err(DataLoadError::FieldCountMismatch {
                expected,
                found: ratings.len(),
                line: line_no,
            });
        }

        matrix.insert_user(UserRatings::new(user, ratings))?;
    }

    Ok(matrix)
}

/// Parse one rating token: `NA` is unrated, anything else must be a
/// finite, non-zero number (zero is reserved by the file format)
fn parse_rating_token(token: &str, file: &str, line: usize) -> Result<RatingSlot> {
    if token == MISSING_MARKER {
        return Ok(None);
    }

    let value = parse_number(token, file, line, "rating")?;
    if value == 0.0 {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Rating 0 is reserved, use {} for unrated movies", MISSING_MARKER),
        });
    }
    Ok(Some(value))
}

fn parse_number(token: &str, file: &str, line: usize, field: &str) -> Result<f64> {
    let value: f64 = token.parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {} '{}': {}", field, token, e),
    })?;

    if !value.is_finite() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Non-finite {} '{}'", field, token),
        });
    }
    Ok(value)
}
