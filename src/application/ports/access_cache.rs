use async_trait::async_trait;

use crate::domain::entities::{access_decision::AccessDecision, user_id::UserId};

/// Short-lived store of access decisions keyed by user.
#[async_trait]
pub trait AccessDecisionCache: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Option<AccessDecision>;

    /// Invalidation counter. Read it before evaluating and pass it to `insert`.
    fn generation(&self) -> u64;

    /// Stores `decision` unless an invalidation happened after `generation` was read.
    async fn insert(&self, user_id: &UserId, decision: AccessDecision, generation: u64);

    async fn invalidate(&self, user_id: &UserId);
}
