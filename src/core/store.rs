//! Tier store interface
//!
//! The persistent user record lives in the surrounding app (keyed by
//! phone number); the engine only needs get/set of the last computed
//! tier. `set` is invoked exactly once per completed assessment.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{StoreError, Tier, UserId};

/// Persistence seam for per-user tiers.
#[async_trait]
pub trait TierStore: Send + Sync {
    /// Last committed tier for a user, `None` if never assessed.
    /// Idempotent and side-effect-free; callers treat `None` as `Low`.
    async fn get(&self, user: &UserId) -> Result<Option<Tier>, StoreError>;

    /// Overwrite the user's tier. The assessment engine is the only
    /// caller, once per completed session.
    async fn set(&self, user: &UserId, tier: Tier) -> Result<(), StoreError>;
}

/// In-process tier store for the CLI, the server default, and tests.
#[derive(Debug, Default)]
pub struct MemoryTierStore {
    records: RwLock<HashMap<UserId, Tier>>,
    set_calls: AtomicUsize,
}

impl MemoryTierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `set` has been invoked (assertable in tests)
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TierStore for MemoryTierStore {
    async fn get(&self, user: &UserId) -> Result<Option<Tier>, StoreError> {
        Ok(self.records.read().await.get(user).copied())
    }

    async fn set(&self, user: &UserId, tier: Tier) -> Result<(), StoreError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.records.write().await.insert(user.clone(), tier);
        Ok(())
    }
}
