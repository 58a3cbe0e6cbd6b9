//! Rating Store
//!
//! Immutable, indexed view over (user, item, rating) triples plus item
//! metadata. Built once from the loaded records; every query afterwards is
//! answered from precomputed per-user and per-item indices.

use crate::error::{RecommenderError, Result};
use crate::types::{Item, ItemId, Rating, UserId};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// How repeated ratings for the same (user, item) pair are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The first rating in input order is kept
    KeepFirst,
    /// The last rating in input order wins
    #[default]
    KeepLast,
    /// Repeated ratings are averaged
    Mean,
}

/// Closed interval of legal rating values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f64,
    pub max: f64,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

impl RatingScale {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(RecommenderError::Configuration {
                message: format!("invalid rating scale [{}, {}]", min, max),
                key: Some("model.rating_min".to_string()),
            });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Options applied while building a [`RatingStore`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    pub duplicate_policy: DuplicatePolicy,
    pub scale: RatingScale,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ItemStats {
    sum: f64,
    count: usize,
}

/// Indexed, read-only rating matrix with item titles
#[derive(Debug, Clone)]
pub struct RatingStore {
    items: BTreeMap<ItemId, Item>,
    by_user: BTreeMap<UserId, BTreeMap<ItemId, f64>>,
    by_item: BTreeMap<ItemId, BTreeMap<UserId, f64>>,
    item_stats: BTreeMap<ItemId, ItemStats>,
    num_ratings: usize,
    options: StoreOptions,
}

impl RatingStore {
    /// Build a store with the default duplicate policy and the 1-5 scale
    pub fn new(ratings: Vec<Rating>, items: Vec<Item>) -> Result<Self> {
        Self::with_options(ratings, items, StoreOptions::default())
    }

    /// Build a store, failing on the first integrity violation
    ///
    /// Errors:
    /// - `DuplicateItem` when two item records share an id
    /// - `InvalidRating` for zero ids or values outside the scale
    /// - `UnknownItem` when a rating references an item with no record
    pub fn with_options(
        ratings: Vec<Rating>,
        items: Vec<Item>,
        options: StoreOptions,
    ) -> Result<Self> {
        let mut item_index: BTreeMap<ItemId, Item> = BTreeMap::new();
        for item in items {
            match item_index.entry(item.item_id) {
                Entry::Vacant(slot) => {
                    slot.insert(item);
                }
                Entry::Occupied(_) => {
                    return Err(RecommenderError::DuplicateItem {
                        item_id: item.item_id,
                    })
                }
            }
        }

        // (user, item) -> (accumulated value, observations)
        let mut cells: BTreeMap<(UserId, ItemId), (f64, usize)> = BTreeMap::new();
        let mut duplicates = 0usize;

        for rating in &ratings {
            Self::validate_rating(rating, &options.scale)?;

            if !item_index.contains_key(&rating.item_id) {
                return Err(RecommenderError::UnknownItem {
                    item_id: rating.item_id,
                    user_id: Some(rating.user_id),
                });
            }

            match cells.entry((rating.user_id, rating.item_id)) {
                Entry::Vacant(slot) => {
                    slot.insert((rating.value, 1));
                }
                Entry::Occupied(mut slot) => {
                    duplicates += 1;
                    let cell = slot.get_mut();
                    match options.duplicate_policy {
                        DuplicatePolicy::KeepFirst => {}
                        DuplicatePolicy::KeepLast => cell.0 = rating.value,
                        DuplicatePolicy::Mean => {
                            cell.0 += rating.value;
                            cell.1 += 1;
                        }
                    }
                }
            }
        }

        if duplicates > 0 {
            warn!(
                duplicates,
                policy = ?options.duplicate_policy,
                "Resolved duplicate (user, item) ratings"
            );
        }

        let mut by_user: BTreeMap<UserId, BTreeMap<ItemId, f64>> = BTreeMap::new();
        let mut by_item: BTreeMap<ItemId, BTreeMap<UserId, f64>> = BTreeMap::new();
        let mut item_stats: BTreeMap<ItemId, ItemStats> = BTreeMap::new();

        for ((user_id, item_id), (accumulated, observations)) in cells {
            let value = match options.duplicate_policy {
                DuplicatePolicy::Mean => accumulated / observations as f64,
                _ => accumulated,
            };

            by_user.entry(user_id).or_default().insert(item_id, value);
            by_item.entry(item_id).or_default().insert(user_id, value);

            let stats = item_stats.entry(item_id).or_default();
            stats.sum += value;
            stats.count += 1;
        }

        let num_ratings = by_user.values().map(BTreeMap::len).sum();

        info!(
            users = by_user.len(),
            items = item_index.len(),
            ratings = num_ratings,
            "Rating store built"
        );

        Ok(Self {
            items: item_index,
            by_user,
            by_item,
            item_stats,
            num_ratings,
            options,
        })
    }

    fn validate_rating(rating: &Rating, scale: &RatingScale) -> Result<()> {
        let reason = if rating.user_id == 0 || rating.item_id == 0 {
            Some("identifiers must be at least 1".to_string())
        } else if !rating.value.is_finite() {
            Some("value is not a finite number".to_string())
        } else if !scale.contains(rating.value) {
            Some(format!("value outside [{}, {}]", scale.min, scale.max))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(RecommenderError::InvalidRating {
                user_id: rating.user_id,
                item_id: rating.item_id,
                value: rating.value,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Items rated by `user_id` (empty for unknown users)
    pub fn ratings_for(&self, user_id: UserId) -> BTreeSet<ItemId> {
        self.by_user
            .get(&user_id)
            .map(|ratings| ratings.keys().copied().collect())
            .unwrap_or_default()
    }

    /// The user's full rating row, ordered by item id
    pub fn user_ratings(&self, user_id: UserId) -> Option<&BTreeMap<ItemId, f64>> {
        self.by_user.get(&user_id)
    }

    /// Every user who rated `item_id`, ordered by user id
    pub fn item_raters(&self, item_id: ItemId) -> Option<&BTreeMap<UserId, f64>> {
        self.by_item.get(&item_id)
    }

    pub fn rating_value(&self, user_id: UserId, item_id: ItemId) -> Option<f64> {
        self.by_user
            .get(&user_id)
            .and_then(|ratings| ratings.get(&item_id))
            .copied()
    }

    /// All catalogued item ids, rated or not
    pub fn all_item_ids(&self) -> BTreeSet<ItemId> {
        self.items.keys().copied().collect()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.keys().copied()
    }

    /// Users with at least one rating, in ascending order
    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.by_user.keys().copied()
    }

    pub fn title(&self, item_id: ItemId) -> Result<&str> {
        self.items
            .get(&item_id)
            .map(|item| item.title.as_str())
            .ok_or(RecommenderError::UnknownItem {
                item_id,
                user_id: None,
            })
    }

    /// Mean rating of an item across all users
    pub fn item_mean(&self, item_id: ItemId) -> Option<f64> {
        self.item_stats
            .get(&item_id)
            .filter(|stats| stats.count > 0)
            .map(|stats| stats.sum / stats.count as f64)
    }

    pub fn item_rating_count(&self, item_id: ItemId) -> usize {
        self.item_stats
            .get(&item_id)
            .map(|stats| stats.count)
            .unwrap_or(0)
    }

    pub fn num_users(&self) -> usize {
        self.by_user.len()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Distinct (user, item) ratings after duplicate resolution
    pub fn num_ratings(&self) -> usize {
        self.num_ratings
    }

    pub fn scale(&self) -> RatingScale {
        self.options.scale
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.options.duplicate_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Item> {
        vec![
            Item::new(1, "Toy Story (1995)"),
            Item::new(2, "GoldenEye (1995)"),
            Item::new(3, "Four Rooms (1995)"),
        ]
    }

    #[test]
    fn test_indices_answer_queries() {
        let ratings = vec![
            Rating::new(1, 1, 5.0),
            Rating::new(1, 2, 3.0),
            Rating::new(2, 2, 4.0),
        ];
        let store = RatingStore::new(ratings, catalog()).unwrap();

        assert_eq!(store.ratings_for(1), BTreeSet::from([1, 2]));
        assert!(store.ratings_for(42).is_empty());
        assert_eq!(store.rating_value(2, 2), Some(4.0));
        assert_eq!(store.rating_value(2, 1), None);
        assert_eq!(store.all_item_ids(), BTreeSet::from([1, 2, 3]));
        assert_eq!(store.title(3).unwrap(), "Four Rooms (1995)");
        assert_eq!(store.item_mean(2), Some(3.5));
        assert_eq!(store.item_mean(3), None);
        assert_eq!(store.item_rating_count(2), 2);
        assert_eq!(store.num_users(), 2);
        assert_eq!(store.num_ratings(), 3);
    }

    #[test]
    fn test_unknown_item_is_fatal() {
        let ratings = vec![Rating::new(1, 1, 5.0), Rating::new(7, 99, 4.0)];
        let err = RatingStore::new(ratings, catalog()).unwrap_err();

        match err {
            RecommenderError::UnknownItem { item_id, user_id } => {
                assert_eq!(item_id, 99);
                assert_eq!(user_id, Some(7));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_item_record_is_fatal() {
        let mut items = catalog();
        items.push(Item::new(2, "GoldenEye (again)"));
        let err = RatingStore::new(Vec::new(), items).unwrap_err();
        assert!(matches!(err, RecommenderError::DuplicateItem { item_id: 2 }));
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_rating_outside_scale_is_rejected() {
        let err = RatingStore::new(vec![Rating::new(1, 1, 5.5)], catalog()).unwrap_err();
        assert!(matches!(err, RecommenderError::InvalidRating { .. }));

        let err = RatingStore::new(vec![Rating::new(1, 1, f64::NAN)], catalog()).unwrap_err();
        assert!(matches!(err, RecommenderError::InvalidRating { .. }));

        let err = RatingStore::new(vec![Rating::new(0, 1, 3.0)], catalog()).unwrap_err();
        assert!(matches!(err, RecommenderError::InvalidRating { user_id: 0, .. }));
    }

    fn duplicated() -> Vec<Rating> {
        vec![
            Rating::new(1, 1, 2.0),
            Rating::new(2, 1, 4.0),
            Rating::new(1, 1, 5.0),
        ]
    }

    fn build_with(policy: DuplicatePolicy) -> RatingStore {
        let options = StoreOptions {
            duplicate_policy: policy,
            ..StoreOptions::default()
        };
        RatingStore::with_options(duplicated(), catalog(), options).unwrap()
    }

    #[test]
    fn test_duplicate_policy_keep_last_is_default() {
        let store = RatingStore::new(duplicated(), catalog()).unwrap();
        assert_eq!(store.duplicate_policy(), DuplicatePolicy::KeepLast);
        assert_eq!(store.rating_value(1, 1), Some(5.0));
        assert_eq!(store.num_ratings(), 2);
        assert_eq!(store.item_rating_count(1), 2);
    }

    #[test]
    fn test_duplicate_policy_keep_first() {
        let store = build_with(DuplicatePolicy::KeepFirst);
        assert_eq!(store.rating_value(1, 1), Some(2.0));
        assert_eq!(store.item_mean(1), Some(3.0));
    }

    #[test]
    fn test_duplicate_policy_mean() {
        let store = build_with(DuplicatePolicy::Mean);
        assert_eq!(store.rating_value(1, 1), Some(3.5));
        assert_eq!(store.item_mean(1), Some(3.75));
    }

    #[test]
    fn test_rating_scale_validation() {
        assert!(RatingScale::new(1.0, 5.0).is_ok());
        assert!(RatingScale::new(5.0, 1.0).is_err());
        assert!(RatingScale::new(f64::NEG_INFINITY, 1.0).is_err());

        let scale = RatingScale::default();
        assert_eq!(scale.clamp(7.2), 5.0);
        assert_eq!(scale.clamp(-3.0), 1.0);
        assert_eq!(scale.clamp(3.3), 3.3);
    }
}
