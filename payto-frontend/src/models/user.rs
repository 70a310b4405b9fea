use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use payto_client::PaytoClient;
use payto_core::models::LoginResponse;
use service_core::middleware::tracing::RequestId;
use tower_sessions::Session;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_ID_KEY: &str = "user_id";
pub const EMAIL_KEY: &str = "email";
pub const NAME_KEY: &str = "name";

/// Keep the login result in the server-side session.
pub async fn remember(session: &Session, login: &LoginResponse) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(ACCESS_TOKEN_KEY, &login.access_token).await?;
    session.insert(USER_ID_KEY, login.user.id.to_string()).await?;
    session.insert(EMAIL_KEY, &login.user.email).await?;
    session.insert(NAME_KEY, &login.user.name).await?;
    Ok(())
}

/// Authenticated user context extracted from session
#[derive(Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    access_token: String,
    request_id: Option<String>,
}

impl std::fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthUser")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AuthUser {
    /// API calls on behalf of this user, tagged with the browser request id.
    pub fn api(&self, client: &PaytoClient) -> payto_client::Session {
        client
            .session(self.access_token.clone())
            .with_request_id(self.request_id.as_deref())
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }

    pub fn initials(&self) -> String {
        let initials: String = self
            .display_name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

fn login_redirect(parts: &Parts) -> Response {
    if parts.headers.contains_key("HX-Request") {
        (StatusCode::UNAUTHORIZED, [("HX-Redirect", "/login")]).into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejection.into_response())?;

        let access_token: Option<String> = session.get(ACCESS_TOKEN_KEY).await.unwrap_or(None);
        let user_id: Option<String> = session.get(USER_ID_KEY).await.unwrap_or(None);
        let email: Option<String> = session.get(EMAIL_KEY).await.unwrap_or(None);

        match (access_token, user_id, email) {
            (Some(access_token), Some(user_id), Some(email)) => {
                let name: Option<String> = session.get(NAME_KEY).await.unwrap_or(None);
                let request_id = parts
                    .extensions
                    .get::<RequestId>()
                    .map(|RequestId(id)| id.clone());

                Ok(AuthUser {
                    user_id,
                    email,
                    name,
                    access_token,
                    request_id,
                })
            }
            _ => Err(login_redirect(parts)),
        }
    }
}
