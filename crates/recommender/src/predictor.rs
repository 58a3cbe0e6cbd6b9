//! Neighborhood Rating Predictor
//!
//! Estimates how a user would rate an item from the ratings their nearest
//! neighbors gave it:
//!
//! ```text
//! estimate = Σ sim_i · r_i / Σ |sim_i|      (clamped to the rating scale)
//! ```
//!
//! taken over the top-k neighbors who rated the item. When none of them did,
//! the item's plain mean rating is used instead and the prediction is tagged
//! [`Basis::HeuristicMean`].

use crate::error::{RecommenderError, Result};
use crate::similarity::{Neighbor, SimilarityEngine};
use crate::store::RatingStore;
use crate::types::{Basis, ItemId, Prediction, UserId};
use tracing::debug;

/// Neighborhood size used when none is configured
pub const DEFAULT_NEIGHBORS: usize = 40;

/// Similarity-weighted k-NN predictor over a rating store
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    store: &'a RatingStore,
    similarity: &'a SimilarityEngine,
    neighbors: usize,
}

impl<'a> Predictor<'a> {
    pub fn new(store: &'a RatingStore, similarity: &'a SimilarityEngine) -> Self {
        Self {
            store,
            similarity,
            neighbors: DEFAULT_NEIGHBORS,
        }
    }

    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors
    }

    /// The top-k neighborhood used for every prediction for `user_id`
    pub fn neighborhood(&self, user_id: UserId) -> Vec<Neighbor> {
        self.similarity.neighbors(user_id, self.neighbors)
    }

    /// Predict a single (user, item) rating
    ///
    /// Fails with `NoRatingData` only when no neighbor rated the item and the
    /// item has no ratings anywhere in the store.
    pub fn predict(&self, user_id: UserId, item_id: ItemId) -> Result<Prediction> {
        let neighborhood = self.neighborhood(user_id);
        self.predict_with(&neighborhood, item_id)
    }

    /// Predict against a precomputed neighborhood
    pub fn predict_with(&self, neighborhood: &[Neighbor], item_id: ItemId) -> Result<Prediction> {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        if let Some(raters) = self.store.item_raters(item_id) {
            for neighbor in neighborhood {
                if neighbor.similarity == 0.0 {
                    continue;
                }
                if let Some(rating) = raters.get(&neighbor.user_id) {
                    weighted_sum += neighbor.similarity * rating;
                    weight_total += neighbor.similarity.abs();
                }
            }
        }

        if weight_total > 0.0 {
            let estimate = self.store.scale().clamp(weighted_sum / weight_total);
            return Ok(Prediction::new(item_id, estimate, Basis::Model));
        }

        self.item_mean_prediction(item_id)
    }

    /// Fallback branch: plain mean of every rating the item received
    pub fn item_mean_prediction(&self, item_id: ItemId) -> Result<Prediction> {
        self.store
            .item_mean(item_id)
            .map(|mean| Prediction::new(item_id, mean, Basis::HeuristicMean))
            .ok_or(RecommenderError::NoRatingData { item_id })
    }

    /// Predict every item in `item_ids`, reusing one neighborhood
    ///
    /// Items without any rating data are skipped.
    pub fn predict_many(
        &self,
        user_id: UserId,
        item_ids: impl IntoIterator<Item = ItemId>,
    ) -> Vec<Prediction> {
        let neighborhood = self.neighborhood(user_id);

        item_ids
            .into_iter()
            .filter_map(|item_id| match self.predict_with(&neighborhood, item_id) {
                Ok(prediction) => Some(prediction),
                Err(err) => {
                    debug!(user_id, item_id, error = %err, "Skipping unpredictable item");
                    None
                }
            })
            .collect()
    }
}
