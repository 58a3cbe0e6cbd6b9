//! Movie Recommendation Engine
//!
//! Recommends unseen movies from explicit rating data with two strategies:
//!
//! - **Model**: user-user neighborhood collaborative filtering. Cosine
//!   similarity over co-rated items, top-k neighbors, similarity-weighted
//!   rating prediction.
//! - **Heuristic**: items rated by co-raters, ranked by the co-raters' mean
//!   rating.
//!
//! Both fall back to global popularity by mean rating when they produce
//! nothing, which is also what cold-start users receive.
//!
//! ```
//! use movie_recommender::{Item, Rating, RatingStore, RecommendationContext, Strategy};
//!
//! let items = vec![Item::new(1, "Toy Story (1995)"), Item::new(2, "Heat (1995)")];
//! let ratings = vec![
//!     Rating::new(1, 1, 5.0),
//!     Rating::new(2, 1, 5.0),
//!     Rating::new(2, 2, 4.0),
//! ];
//!
//! let context = RecommendationContext::new(RatingStore::new(ratings, items)?);
//! let recommendations = context.service().get_recommendations(1, 5, Strategy::Model)?;
//!
//! assert_eq!(recommendations[0].title, "Heat (1995)");
//! # Ok::<(), movie_recommender::RecommenderError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod fallback;
pub mod heuristic;
pub mod loader;
pub mod predictor;
pub mod recommendation;
pub mod similarity;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export key types
pub use config::{ColdStartPolicy, RecommenderConfig};
pub use context::{EngineSettings, RecommendationContext, SharedContext};
pub use error::{RecommenderError, Result};
pub use fallback::FallbackRanker;
pub use heuristic::HeuristicRecommender;
pub use predictor::{Predictor, DEFAULT_NEIGHBORS};
pub use recommendation::RecommendationService;
pub use similarity::{co_rated_cosine, Neighbor, SimilarityEngine};
pub use store::{DuplicatePolicy, RatingScale, RatingStore, StoreOptions};
pub use telemetry::{init_logging, LoggingConfig};
pub use types::*;

#[cfg(test)]
mod tests;
