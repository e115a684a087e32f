//! Memoization of projection results
//!
//! Results are keyed by a structural fingerprint of everything that affects the
//! projection: asset types and values, loan types and terms, the rate table, the
//! horizon and inflation. Names, ids and outstanding balances are not part of the key.
//! Floats are keyed by their bit pattern with `-0.0` folded into `0.0`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::{ScenarioProjections, Settings};
use crate::portfolio::{AssetType, LiabilityType, Portfolio};
use crate::scenario::ScenarioRateTable;

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

/// Structural cache key for one projection request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectionKey {
    assets: Vec<(AssetType, u64)>,
    liabilities: Vec<(LiabilityType, u64, u64, u32)>,
    rates: Vec<(AssetType, [u64; 3])>,
    horizon_years: u32,
    inflation: u64,
}

impl ProjectionKey {
    pub fn new(portfolio: &Portfolio, rates: &ScenarioRateTable, settings: &Settings) -> Self {
        Self {
            assets: portfolio
                .assets()
                .iter()
                .map(|a| (a.asset_type, canonical_bits(a.value)))
                .collect(),
            liabilities: portfolio
                .liabilities()
                .iter()
                .map(|l| {
                    (
                        l.liability_type,
                        canonical_bits(l.principal()),
                        canonical_bits(l.rate()),
                        l.term_years(),
                    )
                })
                .collect(),
            rates: rates
                .iter()
                .map(|(t, r)| {
                    (
                        *t,
                        [
                            canonical_bits(r.pessimistic),
                            canonical_bits(r.base),
                            canonical_bits(r.optimistic),
                        ],
                    )
                })
                .collect(),
            horizon_years: settings.horizon_years,
            inflation: canonical_bits(settings.inflation),
        }
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: Option<usize>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Projection cache with an optional least-recently-used bound
///
/// Entries are shared read-only; a hit hands back the same allocation that was
/// inserted. Without a capacity the cache grows for the lifetime of its owner.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    entries: HashMap<ProjectionKey, Arc<ScenarioProjections>>,

    /// Keys from least to most recently used; only maintained when bounded
    recency: VecDeque<ProjectionKey>,

    capacity: Option<usize>,

    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
}

impl ProjectionCache {
    /// Unbounded cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` entries (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Default::default()
        }
    }

    /// Look up a result, recording a hit or miss
    pub fn get(&mut self, key: &ProjectionKey) -> Option<Arc<ScenarioProjections>> {
        match self.entries.get(key) {
            Some(found) => {
                let found = Arc::clone(found);
                self.cache_hits += 1;
                self.touch(key);
                Some(found)
            }
            None => {
                self.cache_misses += 1;
                None
            }
        }
    }

    /// Store a result, evicting the least recently used entry when full
    pub fn insert(&mut self, key: ProjectionKey, value: Arc<ScenarioProjections>) {
        if let Some(capacity) = self.capacity {
            if !self.entries.contains_key(&key) {
                while self.entries.len() >= capacity {
                    let Some(oldest) = self.recency.pop_front() else {
                        break;
                    };
                    self.entries.remove(&oldest);
                    self.evictions += 1;
                    debug!("Evicted projection cache entry ({} left)", self.entries.len());
                }
            }
            self.touch(&key);
        }
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.cache_hits = 0;
        self.cache_misses = 0;
        self.evictions = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.cache_hits,
            misses: self.cache_misses,
            evictions: self.evictions,
        }
    }

    fn touch(&mut self, key: &ProjectionKey) {
        if self.capacity.is_none() {
            return;
        }
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(key.clone());
    }
}
