use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Bearer credential for one login. Clones share validity, so a 401 seen
/// through any clone invalidates all of them.
#[derive(Clone)]
pub struct AuthContext {
    token: String,
    issued_at: DateTime<Utc>,
    valid: Arc<AtomicBool>,
}

impl AuthContext {
    pub fn issue(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            issued_at: Utc::now(),
            valid: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    pub fn invalidate(&self) {
        if self.valid.swap(false, Ordering::AcqRel) {
            tracing::debug!("Session issued at {} invalidated", self.issued_at);
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Where the user is sent after an action. Only the views this client
/// decides on are listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    ThemeSelection,
    Profile,
    Catalog,
    Matching(MatchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Albums,
    Tracks,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Albums => "albums",
            MatchType::Tracks => "tracks",
        }
    }
}

/// Parameters handed to the matching view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTicket {
    pub target_user_id: i64,
    pub match_type: MatchType,
    pub album_id: Option<i64>,
    pub album_title: Option<String>,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::ThemeSelection => "/theme-selection".to_string(),
            Route::Profile => "/my-profile".to_string(),
            Route::Catalog => "/catalog".to_string(),
            Route::Matching(ticket) => {
                let mut query = url::form_urlencoded::Serializer::new(String::new());
                query.append_pair("targetUserId", &ticket.target_user_id.to_string());
                if let Some(album_id) = ticket.album_id {
                    query.append_pair("albumId", &album_id.to_string());
                }
                if let Some(title) = &ticket.album_title {
                    query.append_pair("albumTitle", title);
                }
                query.append_pair("matchType", ticket.match_type.as_str());
                format!("/matching?{}", query.finish())
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// First-login redirect: only an explicit `true` from the server sends the
/// user to theme selection.
pub fn redirect_after_login(first_login: bool) -> Route {
    if first_login {
        Route::ThemeSelection
    } else {
        Route::Profile
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub auth: AuthContext,
    pub first_login: bool,
    pub redirect: Route,
}
