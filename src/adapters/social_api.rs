use crate::adapters::http::ApiClient;
use crate::core::session::AuthContext;
use crate::domain::social::{FriendRequestOutcome, FriendshipAction, FriendshipPage, FriendshipRequest, MessageBody};
use crate::utils::error::Result;
use reqwest::StatusCode;

const FRIENDSHIPS_PATH: &str = "/api/social/friendships/";

impl ApiClient {
    pub async fn request_friendship(&self, user_id: i64, auth: &AuthContext) -> Result<FriendRequestOutcome> {
        let path = format!("/api/social/users/{}/request-friendship/", user_id);
        let response = self.post_json(&path, &serde_json::json!({}), Some(auth)).await?;
        let status = response.status();
        let body = match Self::decode::<MessageBody>(response, &path).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Friend request to user {} returned no readable message: {}", user_id, e);
                MessageBody::default()
            }
        };

        let outcome = if status == StatusCode::OK {
            FriendRequestOutcome::Accepted { message: body.message }
        } else {
            FriendRequestOutcome::Sent { message: body.message }
        };
        tracing::info!("Friend request to user {}: {:?}", user_id, outcome);
        Ok(outcome)
    }

    pub async fn friend_requests(&self, auth: &AuthContext) -> Result<Vec<FriendshipRequest>> {
        let page: FriendshipPage = self.get_json(FRIENDSHIPS_PATH, Some(auth)).await?;
        Ok(page.into_requests())
    }

    pub async fn respond_to_request(
        &self,
        request_id: i64,
        action: FriendshipAction,
        auth: &AuthContext,
    ) -> Result<()> {
        let path = format!("{}{}/{}/", FRIENDSHIPS_PATH, request_id, action.as_path_segment());
        self.post_json(&path, &serde_json::json!({}), Some(auth)).await?;
        tracing::info!("Friend request {} {}ed", request_id, action);
        Ok(())
    }
}
