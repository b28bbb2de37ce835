use crate::core::engine::RankReorderEngine;
use crate::domain::model::{BatchMoveRequest, ItemId, MoveRequest, Rank, ScopeId, ScopeSnapshot};
use crate::domain::ports::RankStore;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One async mutex per scope. Reorders are read-modify-write over a full
/// scope snapshot, so two concurrent operations on the same scope would race
/// each other's writes; the guard is held for the whole load-to-persist
/// window. Distinct scopes proceed independently.
#[derive(Default)]
struct ScopeLocks {
    inner: Mutex<HashMap<ScopeId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ScopeLocks {
    fn for_scope(&self, scope: &ScopeId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(scope.clone()).or_default().clone()
    }
}

/// Orchestrates one reorder operation: load a snapshot, fold the moves
/// through the engine, persist the net change atomically. Aborts without
/// writing on any precondition or persistence failure; no retries.
pub struct ReorderCoordinator<S: RankStore> {
    store: S,
    locks: ScopeLocks,
}

impl<S: RankStore> ReorderCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: ScopeLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn single_move(
        &self,
        scope: &ScopeId,
        target: &ItemId,
        desired_rank: Rank,
    ) -> Result<ScopeSnapshot> {
        let moves = [MoveRequest {
            target_id: target.clone(),
            desired_rank,
        }];
        self.apply(scope, &moves).await
    }

    /// Applies the batch as one transaction. Move *i* is computed against
    /// the snapshot produced by move *i - 1*; what gets persisted is the
    /// set of items whose rank differs between the original and the final
    /// snapshot.
    pub async fn batch_move(
        &self,
        scope: &ScopeId,
        batch: &BatchMoveRequest,
    ) -> Result<ScopeSnapshot> {
        self.apply(scope, &batch.moves).await
    }

    async fn apply(&self, scope: &ScopeId, moves: &[MoveRequest]) -> Result<ScopeSnapshot> {
        let guard = self.locks.for_scope(scope);
        let _held = guard.lock().await;

        let original = self.store.load_scope(scope).await?;
        tracing::debug!(
            scope = %scope,
            items = original.len(),
            moves = moves.len(),
            "loaded scope snapshot"
        );

        let mut working = original.clone();
        for (index, mv) in moves.iter().enumerate() {
            let outcome = RankReorderEngine::move_item(&working, &mv.target_id, mv.desired_rank)
                .map_err(|err| {
                    tracing::warn!(scope = %scope, index, %err, "reorder aborted, nothing persisted");
                    err
                })?;
            working = outcome.snapshot;
        }

        let changed = RankReorderEngine::diff(&original, &working);
        if changed.is_empty() {
            tracing::debug!(scope = %scope, "no rank changes to persist");
            return Ok(working);
        }

        self.store
            .persist(scope, original.version(), &changed)
            .await
            .map_err(|err| {
                tracing::warn!(scope = %scope, %err, "persist failed, reorder aborted");
                err
            })?;

        tracing::info!(scope = %scope, changed = changed.len(), "persisted rank changes");
        Ok(working)
    }
}
