//! TTL cache for access decisions.
//!
//! Entries are invalidated by the use cases whenever a trial or subscription
//! for the user is written, so the TTL only bounds staleness caused by time
//! passing (a trial or paid period ending between requests).
//!
//! A decision computed before a write must not outlive that write. Every
//! invalidation bumps a counter; a fill whose evaluation started under an
//! older counter is dropped, or removed again if the bump landed mid-insert.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use moka::future::Cache;

use crate::{
    application::ports::access_cache::AccessDecisionCache,
    domain::entities::{access_decision::AccessDecision, user_id::UserId},
};

#[derive(Clone)]
pub struct MokaAccessCache {
    cache: Cache<UserId, AccessDecision>,
    generation: Arc<AtomicU64>,
}

impl MokaAccessCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[async_trait]
impl AccessDecisionCache for MokaAccessCache {
    async fn get(&self, user_id: &UserId) -> Option<AccessDecision> {
        self.cache.get(user_id).await
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn insert(&self, user_id: &UserId, decision: AccessDecision, generation: u64) {
        if self.generation() != generation {
            tracing::debug!(user_id = %user_id, "Skipping stale access decision");
            return;
        }
        self.cache.insert(user_id.clone(), decision).await;
        if self.generation() != generation {
            self.cache.invalidate(user_id).await;
        }
    }

    async fn invalidate(&self, user_id: &UserId) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(user_id).await;
    }
}
