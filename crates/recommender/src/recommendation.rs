//! Recommendation Service
//!
//! Single entry point for the presentation layer. Picks the strategy,
//! excludes already-rated items, ranks, and falls back to global popularity
//! when the personalized path comes up empty.
//!
//! Fallback chain:
//! 1. User has no ratings: popularity ranking (or `UnknownUser` under
//!    [`ColdStartPolicy::Reject`])
//! 2. Model / heuristic strategy
//! 3. Popularity ranking excluding the user's rated items, if step 2 is empty

use crate::config::ColdStartPolicy;
use crate::context::RecommendationContext;
use crate::error::{RecommenderError, Result};
use crate::types::{rank_top_n, ItemId, Prediction, Recommendation, Strategy, UserId};
use std::collections::BTreeSet;
use tracing::debug;

pub struct RecommendationService<'a> {
    context: &'a RecommendationContext,
}

impl<'a> RecommendationService<'a> {
    pub fn new(context: &'a RecommendationContext) -> Self {
        Self { context }
    }

    /// Top `limit` titled recommendations for `user_id`
    ///
    /// `limit == 0` yields an empty list. No returned item is one the user
    /// has already rated.
    pub fn get_recommendations(
        &self,
        user_id: UserId,
        limit: usize,
        strategy: Strategy,
    ) -> Result<Vec<Recommendation>> {
        let store = self.context.store();

        self.predictions(user_id, limit, strategy)?
            .into_iter()
            .map(|prediction| -> Result<Recommendation> {
                Ok(Recommendation {
                    item_id: prediction.item_id,
                    title: store.title(prediction.item_id)?.to_string(),
                    score: prediction.score,
                    basis: prediction.basis,
                })
            })
            .collect()
    }

    /// Ranked predictions without title resolution
    pub fn predictions(
        &self,
        user_id: UserId,
        limit: usize,
        strategy: Strategy,
    ) -> Result<Vec<Prediction>> {
        let _span = tracing::debug_span!("recommend", user_id, limit, %strategy).entered();

        if limit == 0 {
            return Ok(Vec::new());
        }

        let rated = self.context.store().ratings_for(user_id);

        if rated.is_empty() {
            return match self.context.settings().cold_start {
                ColdStartPolicy::Reject => Err(RecommenderError::UnknownUser { user_id }),
                ColdStartPolicy::Fallback => {
                    debug!(user_id, "Cold start user, serving popularity ranking");
                    Ok(self.context.fallback().top_popular(limit, &rated))
                }
            };
        }

        let personalized = match strategy {
            Strategy::Model => self.model_predictions(user_id, &rated, limit),
            Strategy::Heuristic => self.context.heuristic().recommend(user_id, limit),
        };

        if !personalized.is_empty() {
            return Ok(personalized);
        }

        debug!(user_id, %strategy, "No personalized candidates, falling back to popularity");
        Ok(self.context.fallback().top_popular(limit, &rated))
    }

    fn model_predictions(
        &self,
        user_id: UserId,
        rated: &BTreeSet<ItemId>,
        limit: usize,
    ) -> Vec<Prediction> {
        let candidates = self
            .context
            .store()
            .item_ids()
            .filter(|item_id| !rated.contains(item_id));

        let predictions = self.context.predictor().predict_many(user_id, candidates);

        debug!(user_id, predicted = predictions.len(), "Model predictions computed");

        rank_top_n(predictions, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EngineSettings;
    use crate::store::RatingStore;
    use crate::types::{Basis, Item, Rating};

    fn context(settings: EngineSettings) -> RecommendationContext {
        let items = (1..=4).map(|id| Item::new(id, format!("Movie {id}"))).collect();
        let ratings = vec![
            Rating::new(1, 1, 5.0),
            Rating::new(2, 1, 4.0),
            Rating::new(2, 2, 5.0),
            Rating::new(3, 3, 2.0),
        ];
        let store = RatingStore::new(ratings, items).unwrap();
        RecommendationContext::with_settings(store, settings)
    }

    #[test]
    fn test_titles_are_resolved() {
        let ctx = context(EngineSettings::default());
        let recs = ctx
            .service()
            .get_recommendations(1, 5, Strategy::Heuristic)
            .unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_id, 2);
        assert_eq!(recs[0].title, "Movie 2");
        assert_eq!(recs[0].basis, Basis::HeuristicMean);
    }

    #[test]
    fn test_model_skips_items_without_ratings() {
        let ctx = context(EngineSettings::default());
        let recs = ctx.service().predictions(1, 10, Strategy::Model).unwrap();

        let ids: Vec<ItemId> = recs.iter().map(|p| p.item_id).collect();
        // Item 4 has no ratings anywhere; item 3 comes from the item mean.
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(recs[0].basis, Basis::Model);
        assert_eq!(recs[1].basis, Basis::HeuristicMean);
    }

    #[test]
    fn test_cold_start_reject_policy() {
        let ctx = context(EngineSettings {
            cold_start: ColdStartPolicy::Reject,
            ..EngineSettings::default()
        });
        let err = ctx
            .service()
            .get_recommendations(42, 5, Strategy::Model)
            .unwrap_err();
        assert!(matches!(err, RecommenderError::UnknownUser { user_id: 42 }));

        // n = 0 short-circuits before the cold start check.
        assert!(ctx
            .service()
            .get_recommendations(42, 0, Strategy::Model)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_empty_personalized_result_falls_back() {
        let ctx = context(EngineSettings::default());
        // User 3 shares nothing with anyone.
        let recs = ctx.service().predictions(3, 5, Strategy::Heuristic).unwrap();

        let ids: Vec<ItemId> = recs.iter().map(|p| p.item_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(recs.iter().all(|p| p.basis == Basis::PopularityFallback));
    }
}
