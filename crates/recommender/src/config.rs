//! Recommender configuration
//!
//! Layered loading: built-in defaults, then an optional
//! `config/recommender.{toml,yaml,json}` file, then `RECOMMENDER_*`
//! environment variables, with `__` separating nested keys
//! (e.g. `RECOMMENDER_MODEL__NEIGHBORS=20`).

use crate::error::{RecommenderError, Result};
use crate::predictor::DEFAULT_NEIGHBORS;
use crate::store::{DuplicatePolicy, RatingScale, StoreOptions};
use crate::telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do with a user who has no ratings at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColdStartPolicy {
    /// Serve the global popularity ranking
    #[default]
    Fallback,
    /// Fail with `UnknownUser`
    Reject,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Input file locations
    pub data: DataConfig,

    /// Neighborhood model parameters
    pub model: ModelConfig,

    /// Ranking and fallback behavior
    pub ranking: RankingConfig,

    /// Store construction options
    pub store: StoreConfig,

    /// Log output
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// MovieLens `u.data` ratings file
    pub ratings_path: PathBuf,

    /// MovieLens `u.item` catalog file
    pub items_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            ratings_path: PathBuf::from("u.data"),
            items_path: PathBuf::from("u.item"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Neighborhood size k (default: 40)
    pub neighbors: usize,

    /// Lowest legal rating (default: 1.0)
    pub rating_min: f64,

    /// Highest legal rating (default: 5.0)
    pub rating_max: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            rating_min: 1.0,
            rating_max: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Results returned when the caller does not ask for a count (default: 5)
    pub default_limit: usize,

    /// Minimum ratings for an item to enter the popularity ranking (default: 1)
    pub popularity_min_ratings: usize,

    /// Behavior for users without ratings
    pub cold_start: ColdStartPolicy,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            popularity_min_ratings: 1,
            cold_start: ColdStartPolicy::Fallback,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub duplicate_policy: DuplicatePolicy,
}

impl RecommenderConfig {
    /// Load from `config/recommender` (optional) and the environment
    pub fn load() -> Result<Self> {
        Self::build(config::File::with_name("config/recommender").required(false))
    }

    /// Load from an explicit config file, still honoring the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(config::File::from(path.as_ref()))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("RECOMMENDER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_error)?;

        let loaded: Self = settings.try_deserialize().map_err(config_error)?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.neighbors == 0 {
            return Err(RecommenderError::Configuration {
                message: "neighbors must be greater than 0".to_string(),
                key: Some("model.neighbors".to_string()),
            });
        }

        RatingScale::new(self.model.rating_min, self.model.rating_max)?;

        if self.ranking.default_limit == 0 {
            return Err(RecommenderError::Configuration {
                message: "default_limit must be greater than 0".to_string(),
                key: Some("ranking.default_limit".to_string()),
            });
        }

        if self.ranking.popularity_min_ratings == 0 {
            return Err(RecommenderError::Configuration {
                message: "popularity_min_ratings must be greater than 0".to_string(),
                key: Some("ranking.popularity_min_ratings".to_string()),
            });
        }

        Ok(())
    }

    pub fn rating_scale(&self) -> Result<RatingScale> {
        RatingScale::new(self.model.rating_min, self.model.rating_max)
    }

    pub fn store_options(&self) -> Result<StoreOptions> {
        Ok(StoreOptions {
            duplicate_policy: self.store.duplicate_policy,
            scale: self.rating_scale()?,
        })
    }
}

fn config_error(err: config::ConfigError) -> RecommenderError {
    RecommenderError::Configuration {
        message: err.to_string(),
        key: None,
    }
}
