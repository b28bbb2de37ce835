use crate::domain::model::{ItemId, Rank, ScopeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("item '{item}' not found in scope '{scope}'")]
    ItemNotFound { scope: ScopeId, item: ItemId },

    #[error("rank {rank} is outside the bounds [{min}, {max}] of scope '{scope}'")]
    RankOutOfRange {
        scope: ScopeId,
        rank: Rank,
        min: Rank,
        max: Rank,
    },

    #[error("persistence failure: {message}")]
    PersistenceFailure { message: String },

    #[error("scope '{scope}' was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        scope: ScopeId,
        expected: u64,
        found: u64,
    },

    #[error("invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl RankError {
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::PersistenceFailure {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;
