//! Memoised k-combination index tables
//!
//! Inference enumerates every `k`-subset of a trial configuration many times
//! over, for a handful of distinct sizes. The tables are computed once per
//! `(n, k)` and shared by all analyzers holding the same cache.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Index combinations of `k` items out of `n`, in lexicographic order
pub type Combinations = Arc<Vec<Vec<usize>>>;

/// Thread-safe read-through cache of combination tables
#[derive(Debug, Default)]
pub struct CombinationCache {
    tables: RwLock<HashMap<(usize, usize), Combinations>>,
}

impl CombinationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combination table for `(n, k)`, generated on first use
    pub fn get(&self, n: usize, k: usize) -> Combinations {
        {
            let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(table) = tables.get(&(n, k)) {
                return Arc::clone(table);
            }
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(tables.entry((n, k)).or_insert_with(|| {
            trace!("generating combinations C({}, {})", n, k);
            Arc::new(generate_combinations(n, k))
        }))
    }

    /// Number of memoised tables
    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Binomial coefficient C(n, k)
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// All `k`-subsets of `0..n` as sorted index vectors, in lexicographic order
pub fn generate_combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(binomial(n, k));
    let mut current: Vec<usize> = (0..k).collect();

    loop {
        result.push(current.clone());

        // rightmost position that can still advance
        let Some(i) = (0..k).rev().find(|&i| current[i] < n - k + i) else {
            break;
        };
        current[i] += 1;
        for j in i + 1..k {
            current[j] = current[j - 1] + 1;
        }
    }

    result
}
