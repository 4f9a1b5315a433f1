pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ApiClient, HttpRankingSource};
pub use config::ClientConfig;
pub use core::{
    AuthContext, DragState, MatchAccess, MatchingGate, RankedList, RankingController, Route,
    ViewState,
};
pub use domain::model::{CollectionId, RankableItem, RankingSubmission};
pub use utils::error::{ClientError, Result};
