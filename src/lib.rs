pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::json_file::JsonFileStore;
pub use crate::adapters::memory::InMemoryRankStore;
pub use crate::core::coordinator::ReorderCoordinator;
pub use crate::core::engine::{MoveOutcome, RankReorderEngine};
pub use crate::domain::model::{
    BatchMoveRequest, ItemId, MoveRequest, Rank, RankedItem, ScopeId, ScopeSnapshot,
};
pub use crate::domain::ports::RankStore;
pub use crate::utils::error::{RankError, Result};
