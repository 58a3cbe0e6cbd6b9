//! Shared rating fixtures

use crate::store::RatingStore;
use crate::types::{Item, Rating};

/// Catalog of `count` items titled "Movie <id>"
pub fn catalog(count: u32) -> Vec<Item> {
    (1..=count)
        .map(|id| Item::new(id, format!("Movie {id}")))
        .collect()
}

/// Five users, eight movies; items 6 and 7 tie on every mean
pub fn small_store() -> RatingStore {
    let ratings = vec![
        Rating::new(1, 1, 5.0),
        Rating::new(1, 2, 4.0),
        Rating::new(1, 3, 1.0),
        Rating::new(2, 1, 4.0),
        Rating::new(2, 2, 5.0),
        Rating::new(2, 6, 4.0),
        Rating::new(2, 7, 4.0),
        Rating::new(3, 1, 5.0),
        Rating::new(3, 3, 2.0),
        Rating::new(3, 6, 4.0),
        Rating::new(3, 7, 4.0),
        Rating::new(3, 4, 3.0),
        Rating::new(4, 5, 5.0),
        Rating::new(5, 5, 3.0),
        Rating::new(5, 8, 2.0),
    ];
    RatingStore::new(ratings, catalog(8)).expect("fixture is consistent")
}
