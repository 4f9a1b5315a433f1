pub mod analytics;
pub mod controller;
pub mod matching;
pub mod reorder;
pub mod session;

pub use crate::domain::model::{CollectionId, RankableItem, RankingSubmission};
pub use crate::domain::ports::{ConfigProvider, RankingSource};
pub use crate::utils::error::Result;
pub use controller::{LoadApplied, LoadTicket, RankingController, ViewState};
pub use matching::{MatchAccess, MatchingGate};
pub use reorder::{DragState, Move, RankedList};
pub use session::{AuthContext, LoginOutcome, Route};
