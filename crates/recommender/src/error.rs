//! Error types for the recommendation engine

use crate::types::{ItemId, UserId};
use std::path::PathBuf;

/// Common error type for store construction, prediction and configuration
#[derive(Debug, thiserror::Error)]
pub enum RecommenderError {
    #[error("Unknown item {item_id}{}", referenced_by(.user_id))]
    UnknownItem {
        item_id: ItemId,
        /// The user whose rating referenced the item, for load-time failures
        user_id: Option<UserId>,
    },

    #[error("Item {item_id} has no ratings")]
    NoRatingData { item_id: ItemId },

    #[error("User {user_id} has no ratings")]
    UnknownUser { user_id: UserId },

    #[error("Invalid rating {value} by user {user_id} for item {item_id}: {reason}")]
    InvalidRating {
        user_id: UserId,
        item_id: ItemId,
        value: f64,
        reason: String,
    },

    #[error("Duplicate item record for item {item_id}")]
    DuplicateItem { item_id: ItemId },

    #[error("Configuration error: {message}")]
    Configuration { message: String, key: Option<String> },

    #[error("Parse error in {}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("I/O error reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RecommenderError {
    /// Whether the error reports corrupt input data rather than a missing-data condition
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            RecommenderError::UnknownItem { .. }
                | RecommenderError::InvalidRating { .. }
                | RecommenderError::DuplicateItem { .. }
                | RecommenderError::Parse { .. }
        )
    }
}

fn referenced_by(user_id: &Option<UserId>) -> String {
    match user_id {
        Some(user_id) => format!(" (referenced by a rating from user {})", user_id),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, RecommenderError>;
