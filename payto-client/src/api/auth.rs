use crate::client::{PaytoClient, Verb};
use crate::error::ApiError;
use payto_core::models::{LoginRequest, LoginResponse, UserProfile};

pub struct AuthApi<'a> {
    client: &'a PaytoClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a PaytoClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login`
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.client
            .call(Verb::Post, "POST /auth/login", "/auth/login".to_string())
            .body(credentials)?
            .send()
            .await
    }

    /// `GET /auth/me` with an explicit token, used to check a stored session.
    pub async fn me(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        self.client
            .session(access_token)
            .call(Verb::Get, "GET /auth/me", "/auth/me".to_string())
            .send()
            .await
    }
}
