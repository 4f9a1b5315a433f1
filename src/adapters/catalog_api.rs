use crate::adapters::http::ApiClient;
use crate::core::session::AuthContext;
use crate::domain::model::{find_album, Album, RankedTitles, RawRankedTitles, UserSummary};
use crate::utils::error::Result;

const ALBUMS_PATH: &str = "/api/albums/all/";
const USER_SEARCH_PATH: &str = "/api/social/users/search/";
const OWN_RANKED_TITLES_PATH: &str = "/api/rankings/user/ranked-titles/";

impl ApiClient {
    pub async fn albums(&self, auth: Option<&AuthContext>) -> Result<Vec<Album>> {
        self.get_json(ALBUMS_PATH, auth).await
    }

    /// Resolves an album from a loosely written title.
    pub async fn find_album(&self, title: &str, auth: Option<&AuthContext>) -> Result<Option<Album>> {
        let albums = self.albums(auth).await?;
        let found = find_album(&albums, title).cloned();
        tracing::debug!("Album lookup '{}' -> {:?}", title, found.as_ref().map(|a| a.id));
        Ok(found)
    }

    pub async fn search_users(&self, term: &str, auth: &AuthContext) -> Result<Vec<UserSummary>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let request = self.get(USER_SEARCH_PATH)?.query(&[("query", term)]);
        let response = self.send(request, Some(auth)).await?;
        let response = self.expect_success(response, Some(auth)).await?;
        Self::decode(response, USER_SEARCH_PATH).await
    }

    /// Titles ranked by `user_id`, or by the logged-in user when `None`.
    pub async fn ranked_titles(&self, user_id: Option<i64>, auth: &AuthContext) -> Result<RankedTitles> {
        let path = match user_id {
            Some(id) => format!("/api/rankings/user/{}/ranked-titles/", id),
            None => OWN_RANKED_TITLES_PATH.to_string(),
        };
        let raw: RawRankedTitles = self.get_json(&path, Some(auth)).await?;
        Ok(RankedTitles::from_raw(raw))
    }
}
