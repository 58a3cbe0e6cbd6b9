//! Co-Rater Mean Recommender
//!
//! Non-model strategy: users who rated at least one of the target user's
//! items are treated as peers, and every item a peer rated (but the target
//! did not) is scored by the mean rating the peers gave it.

use crate::store::RatingStore;
use crate::types::{rank_top_n, Basis, ItemId, Prediction, UserId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub struct HeuristicRecommender<'a> {
    store: &'a RatingStore,
}

impl<'a> HeuristicRecommender<'a> {
    pub fn new(store: &'a RatingStore) -> Self {
        Self { store }
    }

    /// Other users who rated at least one item `user_id` rated
    pub fn co_raters(&self, user_id: UserId) -> BTreeSet<UserId> {
        let Some(rated) = self.store.user_ratings(user_id) else {
            return BTreeSet::new();
        };

        rated
            .keys()
            .filter_map(|item_id| self.store.item_raters(*item_id))
            .flat_map(|raters| raters.keys().copied())
            .filter(|&other| other != user_id)
            .collect()
    }

    /// Up to `limit` unseen items ranked by co-rater mean rating
    ///
    /// Empty when the user has no co-raters or the co-raters rated nothing
    /// new; the caller decides whether to fall back.
    pub fn recommend(&self, user_id: UserId, limit: usize) -> Vec<Prediction> {
        if limit == 0 {
            return Vec::new();
        }

        let Some(rated) = self.store.user_ratings(user_id) else {
            return Vec::new();
        };

        let co_raters = self.co_raters(user_id);
        if co_raters.is_empty() {
            debug!(user_id, "No co-raters found");
            return Vec::new();
        }

        let mut totals: BTreeMap<ItemId, (f64, usize)> = BTreeMap::new();
        for co_rater in &co_raters {
            let Some(ratings) = self.store.user_ratings(*co_rater) else {
                continue;
            };
            for (&item_id, &value) in ratings {
                if rated.contains_key(&item_id) {
                    continue;
                }
                let entry = totals.entry(item_id).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }

        debug!(
            user_id,
            co_raters = co_raters.len(),
            candidates = totals.len(),
            "Aggregated co-rater candidates"
        );

        let predictions = totals
            .into_iter()
            .map(|(item_id, (sum, count))| {
                Prediction::new(item_id, sum / count as f64, Basis::HeuristicMean)
            })
            .collect();

        rank_top_n(predictions, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, Rating};

    fn store() -> RatingStore {
        let items = (1..=6).map(|id| Item::new(id, format!("Item {id}"))).collect();
        let ratings = vec![
            Rating::new(1, 1, 4.0),
            // co-rater 2
            Rating::new(2, 1, 3.0),
            Rating::new(2, 2, 5.0),
            Rating::new(2, 3, 2.0),
            // co-rater 3
            Rating::new(3, 1, 5.0),
            Rating::new(3, 2, 3.0),
            Rating::new(3, 4, 4.0),
            // user 4 shares nothing with user 1
            Rating::new(4, 5, 1.0),
            Rating::new(4, 2, 1.0),
        ];
        RatingStore::new(ratings, items).unwrap()
    }

    #[test]
    fn test_co_raters() {
        let store = store();
        let recommender = HeuristicRecommender::new(&store);
        assert_eq!(recommender.co_raters(1), BTreeSet::from([2, 3]));
        assert!(recommender.co_raters(99).is_empty());
    }

    #[test]
    fn test_scores_use_co_rater_mean_only() {
        let store = store();
        let recommender = HeuristicRecommender::new(&store);
        let recs = recommender.recommend(1, 10);

        // Item 2 is 4.0 among co-raters even though user 4 rated it 1.0.
        // Items 2 and 4 tie at 4.0, so the lower id comes first.
        let ranked: Vec<(ItemId, f64)> = recs.iter().map(|p| (p.item_id, p.score)).collect();
        assert_eq!(ranked, vec![(2, 4.0), (4, 4.0), (3, 2.0)]);
        assert!(recs.iter().all(|p| p.basis == Basis::HeuristicMean));
    }

    #[test]
    fn test_rated_items_are_excluded() {
        let store = store();
        let recommender = HeuristicRecommender::new(&store);
        assert!(recommender.recommend(1, 10).iter().all(|p| p.item_id != 1));
    }

    #[test]
    fn test_limit_and_empty_cases() {
        let store = store();
        let recommender = HeuristicRecommender::new(&store);
        assert_eq!(recommender.recommend(1, 1).len(), 1);
        assert!(recommender.recommend(1, 0).is_empty());
        assert!(recommender.recommend(99, 5).is_empty());
    }
}
