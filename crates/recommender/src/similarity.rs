//! User-User Similarity
//!
//! Cosine similarity restricted to the co-rated item set: the dot product and
//! both L2 norms are taken only over items the two users have both rated.
//! The full pairwise matrix is computed once per store and is read-only
//! afterwards.
//!
//! Cost is O(U² · avg co-rated) at build time, which is fine for users in the
//! low thousands. Larger catalogs would need an inverted index to skip pairs
//! with no overlap.

use crate::store::RatingStore;
use crate::types::{ItemId, UserId};
use ndarray::{Array2, ArrayView2};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::info;

/// A similar user and how similar they are
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub user_id: UserId,
    pub similarity: f64,
}

/// Cosine similarity over the items both rows contain.
///
/// Returns 0.0 when the rows share no item or a restricted norm is zero.
pub fn co_rated_cosine(a: &BTreeMap<ItemId, f64>, b: &BTreeMap<ItemId, f64>) -> f64 {
    let (small, large, small_is_a) = if a.len() <= b.len() {
        (a, b, true)
    } else {
        (b, a, false)
    };

    let mut dot = 0.0;
    let mut norm_small = 0.0;
    let mut norm_large = 0.0;

    for (item_id, x) in small {
        if let Some(y) = large.get(item_id) {
            dot += x * y;
            norm_small += x * x;
            norm_large += y * y;
        }
    }

    if norm_small == 0.0 || norm_large == 0.0 {
        return 0.0;
    }

    let (norm_a, norm_b) = if small_is_a {
        (norm_small, norm_large)
    } else {
        (norm_large, norm_small)
    };

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Precomputed symmetric user-user similarity matrix
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    /// Dense index -> user id, ascending
    user_ids: Vec<UserId>,
    user_index: HashMap<UserId, usize>,
    /// Diagonal is left at zero; self-similarity is never reported
    matrix: Array2<f64>,
}

impl SimilarityEngine {
    pub fn build(store: &RatingStore) -> Self {
        let started = Instant::now();

        let mut user_ids = Vec::with_capacity(store.num_users());
        let mut rows = Vec::with_capacity(store.num_users());
        for user_id in store.user_ids() {
            if let Some(row) = store.user_ratings(user_id) {
                user_ids.push(user_id);
                rows.push(row);
            }
        }

        let n = user_ids.len();
        let mut matrix = Array2::<f64>::zeros((n, n));
        let mut overlapping_pairs = 0usize;

        for a in 0..n {
            for b in (a + 1)..n {
                let sim = co_rated_cosine(rows[a], rows[b]);
                if sim != 0.0 {
                    overlapping_pairs += 1;
                }
                matrix[[a, b]] = sim;
                matrix[[b, a]] = sim;
            }
        }

        let user_index = user_ids
            .iter()
            .enumerate()
            .map(|(idx, &user_id)| (user_id, idx))
            .collect();

        info!(
            users = n,
            overlapping_pairs,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Similarity matrix computed"
        );

        Self {
            user_ids,
            user_index,
            matrix,
        }
    }

    /// Similarity in [-1, 1]
    ///
    /// Zero for unknown users, for a user paired with themselves, and for
    /// pairs with an empty co-rated set.
    pub fn similarity(&self, user_a: UserId, user_b: UserId) -> f64 {
        if user_a == user_b {
            return 0.0;
        }
        match (self.user_index.get(&user_a), self.user_index.get(&user_b)) {
            (Some(&a), Some(&b)) => self.matrix[[a, b]],
            _ => 0.0,
        }
    }

    /// Up to `k` most similar other users, descending by similarity with
    /// ties going to the lower user id. Users with zero similarity are not
    /// neighbors.
    pub fn neighbors(&self, user_id: UserId, k: usize) -> Vec<Neighbor> {
        let Some(&idx) = self.user_index.get(&user_id) else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let mut neighbors: Vec<Neighbor> = self
            .matrix
            .row(idx)
            .iter()
            .enumerate()
            .filter(|&(other, &sim)| other != idx && sim != 0.0)
            .map(|(other, &sim)| Neighbor {
                user_id: self.user_ids[other],
                similarity: sim,
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        neighbors.truncate(k);
        neighbors
    }

    /// Users covered by the matrix, in row order
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn matrix(&self) -> ArrayView2<'_, f64> {
        self.matrix.view()
    }
}
