use crate::domain::model::{ItemId, RankedItem, ScopeId, ScopeSnapshot};
use crate::domain::ports::RankStore;
use crate::utils::error::{RankError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    scopes: BTreeMap<String, ScopeDocument>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ScopeDocument {
    version: u64,
    items: Vec<StoredItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredItem {
    id: String,
    rank: u32,
    created_at: DateTime<Utc>,
}

/// File-backed `RankStore` holding every scope in one JSON document.
/// Writes go through a temp file followed by a rename, so a crash mid-write
/// leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // one writer at a time per store handle
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Inserts a new item at the end of its scope with the next free rank.
    /// Appends do not bump the scope version; see `InMemoryRankStore`.
    pub async fn insert_item(
        &self,
        scope: &ScopeId,
        id: ItemId,
        created_at: DateTime<Utc>,
    ) -> Result<RankedItem> {
        let _held = self.write_lock.lock().await;
        let mut doc = self.read_document().await?;
        let scope_doc = doc.scopes.entry(scope.as_str().to_string()).or_default();
        if scope_doc.items.iter().any(|item| item.id == id.as_str()) {
            return Err(RankError::persistence(format!(
                "item '{id}' already exists in scope '{scope}'"
            )));
        }

        let snapshot = to_snapshot(scope, scope_doc);
        let item = RankedItem {
            id,
            scope: scope.clone(),
            rank: snapshot.next_rank(),
            created_at,
        };
        scope_doc.items.push(StoredItem {
            id: item.id.as_str().to_string(),
            rank: item.rank,
            created_at: item.created_at,
        });
        self.write_document(&doc).await?;
        Ok(item)
    }

    async fn read_document(&self) -> Result<StoreDocument> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                RankError::persistence(format!(
                    "corrupt store file {}: {err}",
                    self.path.display()
                ))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(err) => Err(RankError::persistence(format!(
                "reading {}: {err}",
                self.path.display()
            ))),
        }
    }

    async fn write_document(&self, doc: &StoreDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(RankError::persistence)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|err| RankError::persistence(format!("writing {}: {err}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|err| {
            RankError::persistence(format!("replacing {}: {err}", self.path.display()))
        })?;
        Ok(())
    }
}

fn to_snapshot(scope: &ScopeId, doc: &ScopeDocument) -> ScopeSnapshot {
    let items = doc
        .items
        .iter()
        .map(|item| RankedItem {
            id: ItemId::new(item.id.clone()),
            scope: scope.clone(),
            rank: item.rank,
            created_at: item.created_at,
        })
        .collect();
    ScopeSnapshot::new(scope.clone(), doc.version, items)
}

#[async_trait]
impl RankStore for JsonFileStore {
    async fn load_scope(&self, scope: &ScopeId) -> Result<ScopeSnapshot> {
        let doc = self.read_document().await?;
        Ok(match doc.scopes.get(scope.as_str()) {
            Some(scope_doc) => to_snapshot(scope, scope_doc),
            None => ScopeSnapshot::empty(scope.clone()),
        })
    }

    async fn persist(
        &self,
        scope: &ScopeId,
        expected_version: u64,
        changed: &[RankedItem],
    ) -> Result<()> {
        let _held = self.write_lock.lock().await;
        let mut doc = self.read_document().await?;
        let scope_doc = doc
            .scopes
            .get_mut(scope.as_str())
            .ok_or_else(|| RankError::persistence(format!("unknown scope '{scope}'")))?;

        if scope_doc.version != expected_version {
            return Err(RankError::ConcurrentModification {
                scope: scope.clone(),
                expected: expected_version,
                found: scope_doc.version,
            });
        }

        // all-or-nothing: resolve every target before writing any rank
        let mut updates = Vec::with_capacity(changed.len());
        for change in changed {
            let index = scope_doc
                .items
                .iter()
                .position(|item| item.id == change.id.as_str())
                .ok_or_else(|| {
                    RankError::persistence(format!(
                        "item '{}' missing from scope '{scope}'",
                        change.id
                    ))
                })?;
            updates.push((index, change.rank));
        }
        for (index, rank) in updates {
            scope_doc.items[index].rank = rank;
        }
        scope_doc.version += 1;
        self.write_document(&doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn ts(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(offset)
    }

    fn scope_id() -> ScopeId {
        ScopeId::new("certifications")
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("ranks.json"));

        let snapshot = store.load_scope(&scope_id()).await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.version(), 0);
    }

    #[tokio::test]
    async fn items_survive_a_store_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ranks.json");
        let scope = scope_id();

        {
            let store = JsonFileStore::new(&path);
            store
                .insert_item(&scope, ItemId::new("a"), ts(0))
                .await
                .unwrap();
            store
                .insert_item(&scope, ItemId::new("b"), ts(1))
                .await
                .unwrap();
        }

        let reopened = JsonFileStore::new(&path);
        let snapshot = reopened.load_scope(&scope).await.unwrap();
        let ids: Vec<&str> = snapshot.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn persist_bumps_the_scope_version_and_rejects_stale_writers() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("ranks.json"));
        let scope = scope_id();
        store
            .insert_item(&scope, ItemId::new("a"), ts(0))
            .await
            .unwrap();
        store
            .insert_item(&scope, ItemId::new("b"), ts(1))
            .await
            .unwrap();

        let stale = store.load_scope(&scope).await.unwrap();
        let mut swapped = stale.items().to_vec();
        swapped[0].rank = 1;
        swapped[1].rank = 0;
        store
            .persist(&scope, stale.version(), &swapped)
            .await
            .unwrap();

        let current = store.load_scope(&scope).await.unwrap();
        assert_eq!(current.version(), stale.version() + 1);

        let err = store
            .persist(&scope, stale.version(), &swapped)
            .await
            .unwrap_err();
        assert!(matches!(err, RankError::ConcurrentModification { .. }));
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_as_persistence_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ranks.json");
        std::fs::write(&path, b"not json at all").unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.load_scope(&scope_id()).await.unwrap_err();
        assert!(matches!(err, RankError::PersistenceFailure { .. }));
    }

    #[tokio::test]
    async fn writes_leave_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("ranks.json"));
        store
            .insert_item(&scope_id(), ItemId::new("a"), ts(0))
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("ranks.json")]);
    }
}
