//! Recommendation Context
//!
//! An immutable snapshot of everything a request needs: the rating store,
//! the similarity matrix derived from it, and the engine settings. Snapshots
//! are shared through `Arc` and never mutated; refreshing data means
//! building a new snapshot and swapping it into a [`SharedContext`].

use crate::config::{ColdStartPolicy, RecommenderConfig};
use crate::error::Result;
use crate::fallback::FallbackRanker;
use crate::heuristic::HeuristicRecommender;
use crate::predictor::{Predictor, DEFAULT_NEIGHBORS};
use crate::recommendation::RecommendationService;
use crate::similarity::SimilarityEngine;
use crate::store::RatingStore;
use crate::types::{Item, Rating};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Per-snapshot engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub neighbors: usize,
    pub popularity_min_ratings: usize,
    pub cold_start: ColdStartPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            popularity_min_ratings: 1,
            cold_start: ColdStartPolicy::Fallback,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &RecommenderConfig) -> Self {
        Self {
            neighbors: config.model.neighbors,
            popularity_min_ratings: config.ranking.popularity_min_ratings,
            cold_start: config.ranking.cold_start,
        }
    }
}

/// Store plus derived similarity, built together and read-only afterwards
#[derive(Debug)]
pub struct RecommendationContext {
    store: RatingStore,
    similarity: SimilarityEngine,
    settings: EngineSettings,
}

impl RecommendationContext {
    pub fn new(store: RatingStore) -> Self {
        Self::with_settings(store, EngineSettings::default())
    }

    pub fn with_settings(store: RatingStore, settings: EngineSettings) -> Self {
        let similarity = SimilarityEngine::build(&store);

        info!(
            users = store.num_users(),
            items = store.num_items(),
            ratings = store.num_ratings(),
            neighbors = settings.neighbors,
            "Recommendation context ready"
        );

        Self {
            store,
            similarity,
            settings,
        }
    }

    /// Validate records into a store and derive the similarity matrix
    pub fn from_records(
        ratings: Vec<Rating>,
        items: Vec<Item>,
        config: &RecommenderConfig,
    ) -> Result<Self> {
        config.validate()?;
        let store = RatingStore::with_options(ratings, items, config.store_options()?)?;
        Ok(Self::with_settings(store, EngineSettings::from_config(config)))
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn similarity(&self) -> &SimilarityEngine {
        &self.similarity
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    pub fn predictor(&self) -> Predictor<'_> {
        Predictor::new(&self.store, &self.similarity).with_neighbors(self.settings.neighbors)
    }

    pub fn heuristic(&self) -> HeuristicRecommender<'_> {
        HeuristicRecommender::new(&self.store)
    }

    pub fn fallback(&self) -> FallbackRanker<'_> {
        FallbackRanker::new(&self.store).with_min_ratings(self.settings.popularity_min_ratings)
    }

    pub fn service(&self) -> RecommendationService<'_> {
        RecommendationService::new(self)
    }
}

/// Swappable handle to the current snapshot
///
/// Readers clone the `Arc` and keep a complete snapshot for as long as they
/// need it; `replace` publishes a new one in a single step.
#[derive(Debug)]
pub struct SharedContext {
    current: RwLock<Arc<RecommendationContext>>,
}

impl SharedContext {
    pub fn new(context: RecommendationContext) -> Self {
        Self {
            current: RwLock::new(Arc::new(context)),
        }
    }

    pub fn snapshot(&self) -> Arc<RecommendationContext> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Publish `context` and return the snapshot it replaced
    pub fn replace(&self, context: RecommendationContext) -> Arc<RecommendationContext> {
        let next = Arc::new(context);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, next);

        info!(
            users = guard.store().num_users(),
            ratings = guard.store().num_ratings(),
            "Recommendation context replaced"
        );

        previous
    }
}
