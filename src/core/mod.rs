pub mod coordinator;
pub mod engine;

pub use crate::domain::model::{BatchMoveRequest, MoveRequest, RankedItem, ScopeSnapshot};
pub use crate::domain::ports::RankStore;
pub use crate::utils::error::Result;
