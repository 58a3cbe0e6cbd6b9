//! Core records shared by every recommendation strategy.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::RecommenderError;

/// Alias for user identifiers (1-based, as in MovieLens).
pub type UserId = u32;
/// Alias for item identifiers (1-based, as in MovieLens).
pub type ItemId = u32;

/// A single explicit rating given by a user to an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub value: f64,
    pub timestamp: Option<i64>,
}

impl Rating {
    pub fn new(user_id: UserId, item_id: ItemId, value: f64) -> Self {
        Self {
            user_id,
            item_id,
            value,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Item metadata record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub title: String,
}

impl Item {
    pub fn new(item_id: ItemId, title: impl Into<String>) -> Self {
        Self {
            item_id,
            title: title.into(),
        }
    }
}

/// Provenance of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Similarity-weighted average over the user's neighborhood
    Model,
    /// Plain mean of ratings (item mean or co-rater mean)
    HeuristicMean,
    /// Global popularity by mean rating
    PopularityFallback,
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Basis::Model => "model",
            Basis::HeuristicMean => "heuristic_mean",
            Basis::PopularityFallback => "popularity_fallback",
        };
        f.write_str(label)
    }
}

/// Estimated score for one item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub item_id: ItemId,
    pub score: f64,
    pub basis: Basis,
}

impl Prediction {
    pub fn new(item_id: ItemId, score: f64, basis: Basis) -> Self {
        Self {
            item_id,
            score,
            basis,
        }
    }

    /// Ranking order: score descending, then item id ascending.
    pub fn ranking_cmp(a: &Prediction, b: &Prediction) -> Ordering {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.item_id.cmp(&b.item_id))
    }
}

/// Sort predictions into ranking order and keep the first `limit`.
pub fn rank_top_n(mut predictions: Vec<Prediction>, limit: usize) -> Vec<Prediction> {
    predictions.sort_by(Prediction::ranking_cmp);
    predictions.truncate(limit);
    predictions
}

/// Recommendation strategy requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Neighborhood collaborative filter with predicted ratings
    Model,
    /// Co-rater mean aggregation
    Heuristic,
}

impl FromStr for Strategy {
    type Err = RecommenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "model" => Ok(Strategy::Model),
            "heuristic" => Ok(Strategy::Heuristic),
            other => Err(RecommenderError::Configuration {
                message: format!("unknown strategy '{}', expected 'model' or 'heuristic'", other),
                key: Some("strategy".to_string()),
            }),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Model => f.write_str("model"),
            Strategy::Heuristic => f.write_str("heuristic"),
        }
    }
}

/// A ranked, titled recommendation handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub title: String,
    pub score: f64,
    pub basis: Basis,
}
