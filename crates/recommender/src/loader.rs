//! MovieLens file loader
//!
//! Reads the MovieLens 100K layout:
//! - `u.data`: tab-separated `user item rating timestamp`, no header
//! - `u.item`: pipe-separated, Latin-1 encoded, no header; only the id and
//!   title columns are used

use crate::config::DataConfig;
use crate::error::{RecommenderError, Result};
use crate::types::{Item, ItemId, Rating, UserId};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Load both ratings and items from the configured paths
pub fn load_dataset(config: &DataConfig) -> Result<(Vec<Rating>, Vec<Item>)> {
    let ratings = load_ratings(&config.ratings_path)?;
    let items = load_items(&config.items_path)?;
    Ok((ratings, items))
}

pub fn load_ratings(path: impl AsRef<Path>) -> Result<Vec<Rating>> {
    let path = path.as_ref();
    let ratings = read_ratings(open(path)?, path)?;
    info!(path = %path.display(), ratings = ratings.len(), "Ratings loaded");
    Ok(ratings)
}

pub fn load_items(path: impl AsRef<Path>) -> Result<Vec<Item>> {
    let path = path.as_ref();
    let items = read_items(open(path)?, path)?;
    info!(path = %path.display(), items = items.len(), "Items loaded");
    Ok(items)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| io_error(path, source))
}

/// Parse `u.data` rows; `source` is only used in error messages
pub fn read_ratings<R: Read>(reader: R, source: &Path) -> Result<Vec<Rating>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut ratings = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(source, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < 3 || record.len() > 4 {
            return Err(parse_error(
                source,
                line,
                format!("expected 3 or 4 fields, found {}", record.len()),
            ));
        }

        let user_id: UserId = parse_field(&record[0], "user id", source, line)?;
        let item_id: ItemId = parse_field(&record[1], "item id", source, line)?;
        let value: f64 = parse_field(&record[2], "rating", source, line)?;

        let mut rating = Rating::new(user_id, item_id, value);
        if let Some(raw) = record.get(3) {
            rating = rating.with_timestamp(parse_field(raw, "timestamp", source, line)?);
        }
        ratings.push(rating);
    }

    Ok(ratings)
}

/// Parse `u.item` rows, decoding titles as Latin-1
pub fn read_items<R: Read>(reader: R, source: &Path) -> Result<Vec<Item>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut items = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| csv_error(source, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < 2 {
            return Err(parse_error(
                source,
                line,
                format!("expected at least 2 fields, found {}", record.len()),
            ));
        }

        let id = decode_latin1(&record[0]);
        let item_id: ItemId = parse_field(id.trim(), "item id", source, line)?;
        items.push(Item::new(item_id, decode_latin1(&record[1])));
    }

    Ok(items)
}

/// Latin-1 maps every byte to the code point of the same value
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn parse_field<T>(raw: &str, what: &str, source: &Path, line: u64) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| parse_error(source, line, format!("invalid {} '{}': {}", what, raw, e)))
}

fn parse_error(source: &Path, line: u64, message: String) -> RecommenderError {
    RecommenderError::Parse {
        path: source.to_path_buf(),
        line,
        message,
    }
}

fn io_error(source: &Path, err: std::io::Error) -> RecommenderError {
    RecommenderError::Io {
        path: source.to_path_buf(),
        source: err,
    }
}

fn csv_error(source: &Path, err: csv::Error) -> RecommenderError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(io) => io_error(source, io),
        other => parse_error(source, line, format!("{:?}", other)),
    }
}
