use crate::adapters::http::ApiClient;
use crate::core::session::AuthContext;
use crate::domain::analytics::CountryRanking;
use crate::domain::model::{CollectionId, RankableItem, RankingSubmission, StoredRanking};
use crate::domain::ports::RankingSource;
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;

const GLOBAL_RANKINGS_PATH: &str = "/api/rankings/global/";

fn tracks_path(collection: CollectionId) -> String {
    format!("/api/tracks/album/{}/", collection)
}

fn track_rankings_path(collection: CollectionId) -> String {
    format!("/api/rankings/tracks/{}/", collection)
}

impl ApiClient {
    pub async fn album_tracks(&self, collection: CollectionId, auth: &AuthContext) -> Result<Vec<RankableItem>> {
        self.get_json(&tracks_path(collection), Some(auth)).await
    }

    pub async fn submit_track_ranking(&self, submission: &RankingSubmission, auth: &AuthContext) -> Result<()> {
        self.post_json(&track_rankings_path(submission.collection_id), submission, Some(auth))
            .await?;
        Ok(())
    }

    /// The logged-in user's saved track ranking for an album.
    pub async fn stored_track_ranking(&self, collection: CollectionId, auth: &AuthContext) -> Result<StoredRanking> {
        self.get_json(&track_rankings_path(collection), Some(auth)).await
    }

    pub async fn global_rankings(&self, auth: Option<&AuthContext>) -> Result<Vec<CountryRanking>> {
        self.get_json(GLOBAL_RANKINGS_PATH, auth).await
    }
}

/// `RankingSource` backed by the tracks/rankings endpoints.
#[derive(Debug, Clone)]
pub struct HttpRankingSource {
    api: ApiClient,
    auth: AuthContext,
}

impl HttpRankingSource {
    pub fn new(api: ApiClient, auth: AuthContext) -> Self {
        Self { api, auth }
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }
}

fn into_fetch_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Api { status: 404, .. } => ClientError::FetchError {
            status: Some(404),
            message: "album not found or invalid endpoint".to_string(),
        },
        ClientError::Api { status, message } => ClientError::FetchError {
            status: Some(status),
            message,
        },
        ClientError::Http(e) => ClientError::FetchError {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        },
        other => other,
    }
}

fn into_persistence_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Api { status, message } => ClientError::PersistenceError {
            status: Some(status),
            message,
        },
        ClientError::Http(e) => ClientError::PersistenceError {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        },
        other => other,
    }
}

#[async_trait]
impl RankingSource for HttpRankingSource {
    async fn fetch_items(&self, collection: CollectionId) -> Result<Vec<RankableItem>> {
        self.api
            .album_tracks(collection, &self.auth)
            .await
            .map_err(into_fetch_error)
    }

    async fn submit_ranking(&self, submission: &RankingSubmission) -> Result<()> {
        self.api
            .submit_track_ranking(submission, &self.auth)
            .await
            .map_err(into_persistence_error)
    }
}
