use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Position of an item within its scope's display sequence.
pub type Rank = u32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names one ordered collection, e.g. "certifications" or "stack".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: ItemId,
    pub scope: ScopeId,
    pub rank: Rank,
    pub created_at: DateTime<Utc>,
}

/// Rank-sorted copy of one scope's items at load time.
///
/// Owned by the single reorder operation that loaded it; never cached or
/// shared across calls. `version` is the store version the snapshot was read
/// at and is what `RankStore::persist` checks against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSnapshot {
    scope: ScopeId,
    version: u64,
    items: Vec<RankedItem>,
}

impl ScopeSnapshot {
    pub fn new(scope: ScopeId, version: u64, mut items: Vec<RankedItem>) -> Self {
        items.sort_by(display_order);
        Self {
            scope,
            version,
            items,
        }
    }

    pub fn empty(scope: ScopeId) -> Self {
        Self::new(scope, 0, Vec::new())
    }

    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Items in display order: rank ascending, then `created_at` descending.
    pub fn items(&self) -> &[RankedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&RankedItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn rank_of(&self, id: &ItemId) -> Option<Rank> {
        self.get(id).map(|item| item.rank)
    }

    /// Smallest and largest rank currently present, `None` for an empty scope.
    pub fn rank_bounds(&self) -> Option<(Rank, Rank)> {
        Some((self.items.first()?.rank, self.items.last()?.rank))
    }

    /// Rank a newly inserted item receives: one past the current maximum.
    pub fn next_rank(&self) -> Rank {
        self.rank_bounds().map_or(0, |(_, max)| max + 1)
    }

    pub fn ordered_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// Same scope and version, new item set (re-sorted).
    pub fn with_items(&self, items: Vec<RankedItem>) -> Self {
        Self::new(self.scope.clone(), self.version, items)
    }
}

fn display_order(a: &RankedItem, b: &RankedItem) -> Ordering {
    a.rank.cmp(&b.rank).then(b.created_at.cmp(&a.created_at))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub target_id: ItemId,
    pub desired_rank: Rank,
}

/// Ordered sequence of moves applied as one all-or-nothing transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMoveRequest {
    pub moves: Vec<MoveRequest>,
}

impl BatchMoveRequest {
    pub fn new(moves: Vec<MoveRequest>) -> Self {
        Self { moves }
    }

    pub fn single(target_id: ItemId, desired_rank: Rank) -> Self {
        Self {
            moves: vec![MoveRequest {
                target_id,
                desired_rank,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
