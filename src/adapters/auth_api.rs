use crate::adapters::http::{extract_error_message, ApiClient};
use crate::core::session::{redirect_after_login, AuthContext, LoginOutcome};
use crate::domain::model::{RegistrationRequest, Theme, UserProfile};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const TOKEN_PATH: &str = "/api/auth/token/";
const FIRST_LOGIN_PATH: &str = "/api/users/me/first-login/";
const LOGOUT_PATH: &str = "/api/auth/logout/";
const REGISTER_PATH: &str = "/api/users/register/";
const ME_PATH: &str = "/api/users/me/";
const CURRENT_THEME_PATH: &str = "/api/users/me/current-theme/";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(alias = "auth_token", alias = "token")]
    access: Option<String>,
}

#[derive(Deserialize)]
struct FirstLoginResponse {
    first_login: bool,
}

#[derive(Deserialize)]
struct ThemeResponse {
    tema: Option<String>,
}

impl ApiClient {
    /// Exchanges credentials for a token, then asks whether this is the
    /// user's first login to decide where to send them.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        validate_non_empty_string("username", username)?;
        validate_non_empty_string("password", password)?;

        let request = self.post(TOKEN_PATH)?.json(&Credentials { username, password });
        let response = self.send(request, None).await?;
        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            let message = if body.contains("non_field_errors") || body.contains("detail") {
                extract_error_message(&body, status)
            } else {
                "Invalid username or password".to_string()
            };
            tracing::warn!("Login rejected for '{}' ({})", username, status);
            return Err(ClientError::InvalidCredentials { message });
        }
        let response = self.expect_success(response, None).await?;
        let token: TokenResponse = Self::decode(response, TOKEN_PATH).await?;
        let token = token
            .access
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::MalformedResponse {
                endpoint: TOKEN_PATH.to_string(),
                reason: "login succeeded but no token was returned".to_string(),
            })?;

        let auth = AuthContext::issue(token);
        let first_login = self.first_login(&auth).await?;
        let redirect = redirect_after_login(first_login);
        tracing::info!("Logged in as '{}', redirecting to {}", username, redirect);

        Ok(LoginOutcome {
            auth,
            first_login,
            redirect,
        })
    }

    pub async fn first_login(&self, auth: &AuthContext) -> Result<bool> {
        let response: FirstLoginResponse = self.get_json(FIRST_LOGIN_PATH, Some(auth)).await?;
        Ok(response.first_login)
    }

    /// Tells the server the session is over. The context is invalidated
    /// whether or not the server could be reached.
    pub async fn logout(&self, auth: &AuthContext) {
        if auth.is_valid() {
            if let Err(e) = self.post_json(LOGOUT_PATH, &serde_json::json!({}), Some(auth)).await {
                tracing::warn!("Logout endpoint failed: {}", e);
            }
        }
        auth.invalidate();
    }

    pub async fn register(&self, request: &RegistrationRequest) -> Result<()> {
        request.validate()?;
        self.post_json(REGISTER_PATH, request, None).await?;
        tracing::info!("Registered user '{}'", request.username);
        Ok(())
    }

    pub async fn me(&self, auth: &AuthContext) -> Result<UserProfile> {
        self.get_json(ME_PATH, Some(auth)).await
    }

    pub async fn user(&self, user_id: i64, auth: &AuthContext) -> Result<UserProfile> {
        self.get_json(&format!("/api/users/{}/", user_id), Some(auth))
            .await
    }

    /// `None` when the user has not picked a theme or the server sent a key
    /// this client does not know.
    pub async fn current_theme(&self, auth: &AuthContext) -> Result<Option<Theme>> {
        let response: ThemeResponse = self.get_json(CURRENT_THEME_PATH, Some(auth)).await?;
        Ok(response.tema.and_then(|key| match key.parse::<Theme>() {
            Ok(theme) => Some(theme),
            Err(_) => {
                tracing::warn!("Unknown theme key '{}'", key);
                None
            }
        }))
    }
}
