use crate::domain::model::{ItemId, Rank, RankedItem, ScopeSnapshot};
use crate::utils::error::{RankError, Result};

/// Result of one move computation: the successor snapshot and the minimal
/// set of items whose rank differs from the input (the target plus the
/// shifted interval).
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub snapshot: ScopeSnapshot,
    pub changed: Vec<RankedItem>,
}

/// Pure reordering core. Takes an immutable snapshot in, returns a new
/// snapshot out; never touches the store and holds no state, so it is safe
/// to call from any number of tasks at once.
pub struct RankReorderEngine;

impl RankReorderEngine {
    /// Moves `target` to `desired_rank`, shifting the intervening items by
    /// one so the scope's multiset of ranks is preserved exactly.
    ///
    /// Moving later: items in `(current, desired]` shift down one rank.
    /// Moving earlier: items in `[desired, current)` shift up one rank.
    /// `desired_rank == current` is a no-op with an empty changed set.
    pub fn move_item(
        snapshot: &ScopeSnapshot,
        target: &ItemId,
        desired_rank: Rank,
    ) -> Result<MoveOutcome> {
        let current = snapshot
            .rank_of(target)
            .ok_or_else(|| RankError::ItemNotFound {
                scope: snapshot.scope().clone(),
                item: target.clone(),
            })?;

        let Some((min, max)) = snapshot.rank_bounds() else {
            return Err(RankError::ItemNotFound {
                scope: snapshot.scope().clone(),
                item: target.clone(),
            });
        };
        if desired_rank < min || desired_rank > max {
            return Err(RankError::RankOutOfRange {
                scope: snapshot.scope().clone(),
                rank: desired_rank,
                min,
                max,
            });
        }

        if desired_rank == current {
            return Ok(MoveOutcome {
                snapshot: snapshot.clone(),
                changed: Vec::new(),
            });
        }

        let mut items = snapshot.items().to_vec();
        for item in &mut items {
            if &item.id == target {
                item.rank = desired_rank;
            } else if current < desired_rank && item.rank > current && item.rank <= desired_rank {
                item.rank -= 1;
            } else if current > desired_rank && item.rank >= desired_rank && item.rank < current {
                item.rank += 1;
            }
        }

        let next = snapshot.with_items(items);
        let changed = Self::diff(snapshot, &next);
        Ok(MoveOutcome {
            snapshot: next,
            changed,
        })
    }

    /// Items of `after` whose rank differs from `before`. For a batch this
    /// is the union that needs persisting; items moved and moved back do
    /// not appear.
    pub fn diff(before: &ScopeSnapshot, after: &ScopeSnapshot) -> Vec<RankedItem> {
        after
            .items()
            .iter()
            .filter(|item| before.rank_of(&item.id) != Some(item.rank))
            .cloned()
            .collect()
    }
}
