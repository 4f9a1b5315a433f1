use crate::domain::model::{CollectionId, RankableItem, RankingSubmission};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
    fn collection_id(&self) -> Option<CollectionId>;
}

/// Where a ranking list comes from and where it is persisted.
///
/// Implementations translate transport failures into `FetchError` on the
/// read side and `PersistenceError` on the write side, and report a 401 on
/// either as `AuthExpired`.
#[async_trait]
pub trait RankingSource: Send + Sync {
    async fn fetch_items(&self, collection: CollectionId) -> Result<Vec<RankableItem>>;
    async fn submit_ranking(&self, submission: &RankingSubmission) -> Result<()>;
}
