use crate::adapters::http::ApiClient;
use crate::core::session::{AuthContext, MatchTicket, MatchType, Route};
use crate::domain::model::CollectionId;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchAccess {
    Granted(MatchTicket),
    /// The user has to rank the album's tracks first.
    RankingRequired { album_id: i64, album_title: String },
    UnknownAlbum,
}

impl MatchAccess {
    pub fn route(&self) -> Option<Route> {
        match self {
            MatchAccess::Granted(ticket) => Some(Route::Matching(ticket.clone())),
            _ => None,
        }
    }
}

/// Decides whether the logged-in user may open a compatibility view against
/// another user.
pub struct MatchingGate<'a> {
    api: &'a ApiClient,
    auth: &'a AuthContext,
}

impl<'a> MatchingGate<'a> {
    pub fn new(api: &'a ApiClient, auth: &'a AuthContext) -> Self {
        Self { api, auth }
    }

    /// Album-level matching has no prerequisite.
    pub fn albums(&self, target_user_id: i64) -> MatchAccess {
        MatchAccess::Granted(MatchTicket {
            target_user_id,
            match_type: MatchType::Albums,
            album_id: None,
            album_title: None,
        })
    }

    /// Track-level matching requires the user's own ranking of that album.
    pub async fn check(&self, target_user_id: i64, album_title: &str) -> Result<MatchAccess> {
        let Some(album) = self.api.find_album(album_title, Some(self.auth)).await? else {
            tracing::warn!("No album matches '{}'", album_title);
            return Ok(MatchAccess::UnknownAlbum);
        };

        let stored = self
            .api
            .stored_track_ranking(CollectionId(album.id), self.auth)
            .await?;

        if stored.is_complete() {
            Ok(MatchAccess::Granted(MatchTicket {
                target_user_id,
                match_type: MatchType::Tracks,
                album_id: Some(album.id),
                album_title: Some(album.title),
            }))
        } else {
            tracing::info!("Album '{}' has not been ranked yet", album.title);
            Ok(MatchAccess::RankingRequired {
                album_id: album.id,
                album_title: album.title,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ClientError;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.base_url(), Duration::from_secs(5), "swiftmatch-test").unwrap()
    }

    fn mock_albums(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/albums/all/");
            then.status(200).json_body(serde_json::json!([
                {"id": 1, "title": "Taylor Swift"},
                {"id": 4, "title": "Red (Taylor's Version)"}
            ]));
        });
    }

    #[tokio::test]
    async fn test_granted_when_ranking_exists() {
        let server = MockServer::start();
        mock_albums(&server);
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/rankings/tracks/4/")
                .header("Authorization", "Bearer tok");
            then.status(200)
                .json_body(serde_json::json!({"rankings": [{"track_id": 40, "position": 1}]}));
        });

        let api = client(&server);
        let auth = AuthContext::issue("tok");
        let access = MatchingGate::new(&api, &auth).check(9, "red").await.unwrap();

        let route = access.route().unwrap();
        assert!(route.path().starts_with("/matching?targetUserId=9&albumId=4"));
        assert!(route.path().ends_with("matchType=tracks"));
    }

    #[tokio::test]
    async fn test_ranking_required_when_empty() {
        let server = MockServer::start();
        mock_albums(&server);
        server.mock(|when, then| {
            when.method(GET).path("/api/rankings/tracks/1/");
            then.status(200).json_body(serde_json::json!({"rankings": []}));
        });

        let api = client(&server);
        let auth = AuthContext::issue("tok");
        let access = MatchingGate::new(&api, &auth)
            .check(9, "Taylor Swift")
            .await
            .unwrap();
        assert_eq!(
            access,
            MatchAccess::RankingRequired { album_id: 1, album_title: "Taylor Swift".to_string() }
        );
        assert!(access.route().is_none());
    }

    #[tokio::test]
    async fn test_unknown_album_and_expired_session() {
        let server = MockServer::start();
        mock_albums(&server);
        server.mock(|when, then| {
            when.method(GET).path("/api/rankings/tracks/1/");
            then.status(401).json_body(serde_json::json!({"detail": "Token expired"}));
        });

        let api = client(&server);
        let auth = AuthContext::issue("tok");
        let gate = MatchingGate::new(&api, &auth);

        assert_eq!(gate.check(9, "Lover").await.unwrap(), MatchAccess::UnknownAlbum);
        assert!(matches!(gate.check(9, "taylor swift").await, Err(ClientError::AuthExpired)));
        assert!(!auth.is_valid());
    }

    #[test]
    fn test_album_matching_is_always_granted() {
        let api = ApiClient::new("http://localhost:8000", Duration::from_secs(5), "t").unwrap();
        let auth = AuthContext::issue("tok");
        let route = MatchingGate::new(&api, &auth).albums(3).route().unwrap();
        assert_eq!(route.path(), "/matching?targetUserId=3&matchType=albums");
    }
}
