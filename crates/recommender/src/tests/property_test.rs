//! Property-based invariants over randomly generated rating stores

use super::fixtures::catalog;
use crate::context::RecommendationContext;
use crate::similarity::SimilarityEngine;
use crate::store::RatingStore;
use crate::types::{Rating, Strategy as RecommendStrategy};
use proptest::prelude::*;

const USERS: u32 = 12;
const ITEMS: u32 = 15;

fn ratings_strategy() -> impl Strategy<Value = Vec<Rating>> {
    prop::collection::vec((1..=USERS, 1..=ITEMS, 1u8..=5), 0..90).prop_map(|rows| {
        rows.into_iter()
            .map(|(user_id, item_id, value)| Rating::new(user_id, item_id, f64::from(value)))
            .collect()
    })
}

fn build(ratings: Vec<Rating>) -> RatingStore {
    RatingStore::new(ratings, catalog(ITEMS)).expect("generated ratings are valid")
}

proptest! {
    #[test]
    fn prop_results_bounded_and_unseen(ratings in ratings_strategy(), limit in 0usize..8) {
        let ctx = RecommendationContext::new(build(ratings));
        let service = ctx.service();

        for user_id in 1..=USERS + 1 {
            let rated = ctx.store().ratings_for(user_id);
            for strategy in [RecommendStrategy::Model, RecommendStrategy::Heuristic] {
                let recs = service.get_recommendations(user_id, limit, strategy).unwrap();
                prop_assert!(recs.len() <= limit);
                prop_assert!(recs.iter().all(|r| !rated.contains(&r.item_id)));
            }
        }
    }

    #[test]
    fn prop_similarity_symmetric_and_bounded(ratings in ratings_strategy()) {
        let store = build(ratings);
        let engine = SimilarityEngine::build(&store);

        for a in 1..=USERS {
            prop_assert_eq!(engine.similarity(a, a), 0.0);
            for b in 1..=USERS {
                let sim = engine.similarity(a, b);
                prop_assert_eq!(sim, engine.similarity(b, a));
                prop_assert!((-1.0..=1.0).contains(&sim));
            }
        }
    }

    #[test]
    fn prop_neighbors_sorted_without_self(ratings in ratings_strategy(), k in 0usize..6) {
        let store = build(ratings);
        let engine = SimilarityEngine::build(&store);

        for user_id in 1..=USERS {
            let neighbors = engine.neighbors(user_id, k);
            prop_assert!(neighbors.len() <= k);
            prop_assert!(neighbors.iter().all(|n| n.user_id != user_id));
            for pair in neighbors.windows(2) {
                prop_assert!(
                    pair[0].similarity > pair[1].similarity
                        || (pair[0].similarity == pair[1].similarity
                            && pair[0].user_id < pair[1].user_id)
                );
            }
        }
    }

    #[test]
    fn prop_predictions_within_scale(ratings in ratings_strategy()) {
        let ctx = RecommendationContext::new(build(ratings));
        let predictor = ctx.predictor();

        for user_id in 1..=USERS {
            for prediction in predictor.predict_many(user_id, 1..=ITEMS) {
                prop_assert!((1.0..=5.0).contains(&prediction.score));
            }
        }
    }

    #[test]
    fn prop_construction_is_deterministic(ratings in ratings_strategy()) {
        let first = build(ratings.clone());
        let second = build(ratings);

        prop_assert_eq!(first.all_item_ids(), second.all_item_ids());

        let first_engine = SimilarityEngine::build(&first);
        let second_engine = SimilarityEngine::build(&second);
        prop_assert_eq!(first_engine.user_ids(), second_engine.user_ids());
        prop_assert_eq!(first_engine.matrix(), second_engine.matrix());
    }
}
