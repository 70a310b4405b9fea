use crate::api::{
    afip::AfipApi, audit::AuditApi, auth::AuthApi, companies::CompaniesApi,
    counterparties::CounterpartiesApi, invoices::InvoicesApi, members::MembersApi,
    network::NetworkApi, payments::PaymentsApi, tasks::TasksApi,
};
use crate::config::ApiConfig;
use crate::envelope;
use crate::error::ApiError;
use metrics::{counter, histogram};
use payto_core::models::CounterpartyKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use service_core::observability::TracedClientExt;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Process-wide PayTo API client. Cheap to clone; the connection pool is
/// shared.
#[derive(Debug, Clone)]
pub struct PaytoClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl PaytoClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::Config("base_url is empty".to_string()));
        }
        if config.page_size == 0 {
            return Err(ApiError::Config("page_size must be positive".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ApiError::Http {
                endpoint: "client_init",
                source,
            })?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                page_size: config.page_size,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Calls made on behalf of a signed-in user.
    pub fn session(&self, access_token: impl Into<String>) -> Session {
        Session {
            client: self.clone(),
            token: Arc::from(access_token.into()),
            request_id: None,
        }
    }

    /// Unauthenticated endpoints (login).
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub(crate) fn call(&self, verb: Verb, endpoint: &'static str, path: String) -> Call<'_> {
        Call {
            client: self,
            token: None,
            request_id: None,
            verb,
            endpoint,
            path,
            query: Vec::new(),
            body: None,
        }
    }
}

/// A user's view of the API: every call carries their bearer token.
#[derive(Clone)]
pub struct Session {
    client: PaytoClient,
    token: Arc<str>,
    request_id: Option<Arc<str>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.client.base_url())
            .field("token", &"[redacted]")
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl Session {
    /// Forward the incoming request id on every outgoing call.
    pub fn with_request_id(mut self, request_id: Option<&str>) -> Self {
        self.request_id = request_id.map(Arc::from);
        self
    }

    pub fn client(&self) -> &PaytoClient {
        &self.client
    }

    pub(crate) fn call(&self, verb: Verb, endpoint: &'static str, path: String) -> Call<'_> {
        let mut call = self.client.call(verb, endpoint, path);
        call.token = Some(&*self.token);
        call.request_id = self.request_id.as_deref();
        call
    }

    pub fn companies(&self) -> CompaniesApi<'_> {
        CompaniesApi::new(self)
    }

    pub fn invoices(&self, company_id: Uuid) -> InvoicesApi<'_> {
        InvoicesApi::new(self, company_id)
    }

    pub fn payments(&self, company_id: Uuid) -> PaymentsApi<'_> {
        PaymentsApi::new(self, company_id)
    }

    pub fn counterparties(&self, company_id: Uuid, kind: CounterpartyKind) -> CounterpartiesApi<'_> {
        CounterpartiesApi::new(self, company_id, kind)
    }

    pub fn members(&self, company_id: Uuid) -> MembersApi<'_> {
        MembersApi::new(self, company_id)
    }

    pub fn network(&self, company_id: Uuid) -> NetworkApi<'_> {
        NetworkApi::new(self, company_id)
    }

    pub fn afip(&self, company_id: Uuid) -> AfipApi<'_> {
        AfipApi::new(self, company_id)
    }

    pub fn audit(&self, company_id: Uuid) -> AuditApi<'_> {
        AuditApi::new(self, company_id)
    }

    pub fn tasks(&self, company_id: Uuid) -> TasksApi<'_> {
        TasksApi::new(self, company_id)
    }

    pub fn logout(&self) -> impl std::future::Future<Output = Result<(), ApiError>> + '_ {
        self.call(Verb::Post, "POST /auth/logout", "/auth/logout".to_string())
            .send_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// One request being assembled.
pub(crate) struct Call<'a> {
    client: &'a PaytoClient,
    token: Option<&'a str>,
    request_id: Option<&'a str>,
    verb: Verb,
    endpoint: &'static str,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
}

impl<'a> Call<'a> {
    pub(crate) fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub(crate) fn body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|source| ApiError::Encode {
            endpoint: self.endpoint,
            source,
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Send and decode the (possibly enveloped) payload.
    pub(crate) async fn send<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let endpoint = self.endpoint;
        let body = self.execute().await?;
        envelope::decode(&body).map_err(|source| {
            tracing::error!(endpoint, error = %source, "Failed to decode PayTo API response");
            ApiError::Decode { endpoint, source }
        })
    }

    /// Send and ignore the payload.
    pub(crate) async fn send_empty(self) -> Result<(), ApiError> {
        self.execute().await.map(|_| ())
    }

    async fn execute(self) -> Result<String, ApiError> {
        let endpoint = self.endpoint;
        let url = format!("{}{}", self.client.inner.base_url, self.path);
        let http = &self.client.inner.http;

        let mut request = match self.verb {
            Verb::Get => http.traced_get(&url),
            Verb::Post => http.traced_post(&url),
            Verb::Put => http.traced_put(&url),
            Verb::Patch => http.traced_patch(&url),
            Verb::Delete => http.traced_delete(&url),
        }
        .request_id(self.request_id);

        if let Some(token) = self.token {
            request = request.bearer_auth(token);
        }
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        if let Some(body) = &self.body {
            request = request.json(body);
        }

        let started = Instant::now();
        let result = request.send().await;
        histogram!("payto_api_request_duration_seconds", "endpoint" => endpoint)
            .record(started.elapsed().as_secs_f64());

        let response = result.map_err(|source| {
            counter!("payto_api_requests_total", "endpoint" => endpoint, "status" => "transport_error")
                .increment(1);
            tracing::error!(endpoint, url = %url, error = %source, "PayTo API request failed");
            ApiError::Http { endpoint, source }
        })?;

        let status = response.status();
        counter!(
            "payto_api_requests_total",
            "endpoint" => endpoint,
            "status" => status.as_u16().to_string()
        )
        .increment(1);

        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Http { endpoint, source })?;

        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "PayTo API returned an error");
            return Err(ApiError::from_response(endpoint, status.as_u16(), &body));
        }

        tracing::debug!(endpoint, status = status.as_u16(), "PayTo API call succeeded");
        Ok(body)
    }
}
