use crate::domain::model::{ItemId, RankedItem, ScopeId, ScopeSnapshot};
use crate::domain::ports::RankStore;
use crate::utils::error::{RankError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct ScopeState {
    version: u64,
    items: Vec<RankedItem>,
}

/// In-memory `RankStore` for tests and demos. Cloning shares the backing map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRankStore {
    scopes: Arc<Mutex<HashMap<ScopeId, ScopeState>>>,
}

impl InMemoryRankStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new item at the end of its scope, assigning the next free
    /// rank. Insertion is the only path that creates a rank; reorders only
    /// reassign existing ones. Appends do not bump the scope version: an
    /// appended rank lies past any loaded snapshot's bounds and cannot
    /// collide with an in-flight reorder's shifted interval.
    pub async fn insert_item(
        &self,
        scope: &ScopeId,
        id: ItemId,
        created_at: DateTime<Utc>,
    ) -> Result<RankedItem> {
        let mut scopes = self.scopes.lock().await;
        let state = scopes.entry(scope.clone()).or_default();
        if state.items.iter().any(|item| item.id == id) {
            return Err(RankError::persistence(format!(
                "item '{id}' already exists in scope '{scope}'"
            )));
        }

        let snapshot = ScopeSnapshot::new(scope.clone(), state.version, state.items.clone());
        let item = RankedItem {
            id,
            scope: scope.clone(),
            rank: snapshot.next_rank(),
            created_at,
        };
        state.items.push(item.clone());
        Ok(item)
    }
}

#[async_trait]
impl RankStore for InMemoryRankStore {
    async fn load_scope(&self, scope: &ScopeId) -> Result<ScopeSnapshot> {
        let scopes = self.scopes.lock().await;
        Ok(match scopes.get(scope) {
            Some(state) => ScopeSnapshot::new(scope.clone(), state.version, state.items.clone()),
            None => ScopeSnapshot::empty(scope.clone()),
        })
    }

    async fn persist(
        &self,
        scope: &ScopeId,
        expected_version: u64,
        changed: &[RankedItem],
    ) -> Result<()> {
        let mut scopes = self.scopes.lock().await;
        let state = scopes
            .get_mut(scope)
            .ok_or_else(|| RankError::persistence(format!("unknown scope '{scope}'")))?;

        if state.version != expected_version {
            return Err(RankError::ConcurrentModification {
                scope: scope.clone(),
                expected: expected_version,
                found: state.version,
            });
        }

        // all-or-nothing: resolve every target before writing any rank
        let mut updates = Vec::with_capacity(changed.len());
        for change in changed {
            let index = state
                .items
                .iter()
                .position(|item| item.id == change.id)
                .ok_or_else(|| {
                    RankError::persistence(format!(
                        "item '{}' missing from scope '{scope}'",
                        change.id
                    ))
                })?;
            updates.push((index, change.rank));
        }
        for (index, rank) in updates {
            state.items[index].rank = rank;
        }
        state.version += 1;
        Ok(())
    }
}
