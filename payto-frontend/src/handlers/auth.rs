use crate::error::PageError;
use crate::handlers::hx_redirect;
use crate::models::user::{self, AuthUser};
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use payto_core::models::LoginRequest;
use service_core::error::AppError;
use tower_sessions::Session;
use validator::Validate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate {}
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(credentials): Form<LoginRequest>,
) -> Result<Response, PageError> {
    credentials.validate()?;

    let login = state.api.auth().login(&credentials).await.map_err(|err| {
        if err.is_unauthorized() {
            // bad credentials, not an expired session
            PageError(AppError::BadRequest(anyhow::anyhow!(err.user_message())))
        } else {
            err.into()
        }
    })?;
    user::remember(&session, &login).await?;

    tracing::info!(user_id = %login.user.id, "User signed in");
    Ok(hx_redirect("/dashboard"))
}

pub async fn logout_handler(State(state): State<AppState>, user: AuthUser, session: Session) -> Result<Response, PageError> {
    if let Err(err) = user.api(&state.api).logout().await {
        tracing::warn!(error = %err, "Logout call failed; clearing the session anyway");
    }
    state.sidebar.invalidate(&user.user_id);
    session.flush().await?;
    Ok(hx_redirect("/login"))
}
