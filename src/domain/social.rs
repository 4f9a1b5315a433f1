use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
    Unknown,
}

impl FriendshipStatus {
    /// Case-insensitive; anything unrecognised becomes `Unknown`.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => FriendshipStatus::Pending,
            "accepted" => FriendshipStatus::Accepted,
            "rejected" => FriendshipStatus::Rejected,
            _ => FriendshipStatus::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for FriendshipStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(FriendshipStatus::from_wire(&raw))
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Rejected => "rejected",
            FriendshipStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendshipRequest {
    pub id: i64,
    pub from_user: i64,
    pub from_username: String,
    pub to_username: String,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl FriendshipRequest {
    pub fn is_pending(&self) -> bool {
        self.status == FriendshipStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipAction {
    Accept,
    Reject,
}

impl FriendshipAction {
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            FriendshipAction::Accept => "accept",
            FriendshipAction::Reject => "reject",
        }
    }
}

impl fmt::Display for FriendshipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

/// Result of asking to befriend someone. A request that meets a pending
/// request in the other direction is accepted straight away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendRequestOutcome {
    Sent { message: Option<String> },
    Accepted { message: Option<String> },
}

/// The friendships endpoint answers with a bare list or, when paginated,
/// with the list under `results`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum FriendshipPage {
    List(Vec<FriendshipRequest>),
    Page { results: Vec<FriendshipRequest> },
}

impl FriendshipPage {
    pub(crate) fn into_requests(self) -> Vec<FriendshipRequest> {
        match self {
            FriendshipPage::List(requests) | FriendshipPage::Page { results: requests } => requests,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MessageBody {
    pub message: Option<String>,
}
