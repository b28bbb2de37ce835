use crate::domain::model::{RankedItem, ScopeId, ScopeSnapshot};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence port for scoped rank data.
///
/// `persist` is the subsystem's only atomicity boundary: engine output stays
/// provisional until it returns `Ok`.
#[async_trait]
pub trait RankStore: Send + Sync {
    /// Loads every item of `scope` sorted by rank, then `created_at`
    /// descending. An unknown or empty scope yields an empty snapshot,
    /// not an error.
    async fn load_scope(&self, scope: &ScopeId) -> Result<ScopeSnapshot>;

    /// Writes the ranks (and only the ranks) of `changed` in one
    /// transaction; either all of them land or none do.
    ///
    /// Fails with `ConcurrentModification` when the scope's version no
    /// longer equals `expected_version`, i.e. someone wrote between the
    /// caller's `load_scope` and this call.
    async fn persist(
        &self,
        scope: &ScopeId,
        expected_version: u64,
        changed: &[RankedItem],
    ) -> Result<()>;
}
