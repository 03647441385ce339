//! Bounded cache of engine scores, owned by a session.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use lru::LruCache;

use crate::azul_move::AzulMove;
use crate::engine::EngineScore;

type CacheKey = (u64, AzulMove, String);

pub struct ScoreCache {
    entries: Mutex<LruCache<CacheKey, EngineScore>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ScoreCache {
    /// Returns `None` for a zero capacity, which disables caching.
    pub fn new(capacity: usize) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    pub fn get(&self, position_hash: u64, azul_move: &AzulMove, engine: &str) -> Option<EngineScore> {
        let key = (position_hash, *azul_move, engine.to_string());
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&key) {
            Some(score) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(score.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Failures are not cached.
    pub fn insert(&self, position_hash: u64, azul_move: &AzulMove, engine: &str, score: &EngineScore) {
        if !score.is_success() {
            return;
        }
        let key = (position_hash, *azul_move, engine.to_string());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, score.clone());
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
