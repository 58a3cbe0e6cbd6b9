//! Popularity Fallback
//!
//! Global ranking by mean rating, used for cold-start users and whenever a
//! personalized strategy produces no candidates.

use crate::store::RatingStore;
use crate::types::{rank_top_n, Basis, ItemId, Prediction};
use std::collections::BTreeSet;

pub struct FallbackRanker<'a> {
    store: &'a RatingStore,
    min_ratings: usize,
}

impl<'a> FallbackRanker<'a> {
    pub fn new(store: &'a RatingStore) -> Self {
        Self {
            store,
            min_ratings: 1,
        }
    }

    /// Require at least `min_ratings` ratings before an item can rank
    pub fn with_min_ratings(mut self, min_ratings: usize) -> Self {
        self.min_ratings = min_ratings.max(1);
        self
    }

    /// Highest mean-rated items, skipping everything in `excluding`
    pub fn top_popular(&self, limit: usize, excluding: &BTreeSet<ItemId>) -> Vec<Prediction> {
        if limit == 0 {
            return Vec::new();
        }

        let predictions = self
            .store
            .item_ids()
            .filter(|item_id| !excluding.contains(item_id))
            .filter(|&item_id| self.store.item_rating_count(item_id) >= self.min_ratings)
            .filter_map(|item_id| {
                self.store
                    .item_mean(item_id)
                    .map(|mean| Prediction::new(item_id, mean, Basis::PopularityFallback))
            })
            .collect();

        rank_top_n(predictions, limit)
    }
}
