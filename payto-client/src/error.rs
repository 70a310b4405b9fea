use serde::Deserialize;
use service_core::error::{AppError, GENERIC_UPSTREAM_MESSAGE};
use thiserror::Error;

/// Shown when a bulk operation stops at its first failure.
pub const BATCH_FAILURE_MESSAGE: &str =
    "No se pudieron completar todas las operaciones. Revisá el listado e intentá nuevamente.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx answer. `message` is the server's own text, or the generic
    /// fallback when the body carried none.
    #[error("{endpoint} returned {status}: {message}")]
    Api {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode request for {endpoint}: {source}")]
    Encode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API client configuration: {0}")]
    Config(String),

    /// A bulk operation aborted; `first` is the failure that stopped it.
    #[error("batch aborted: {first}")]
    Batch { first: Box<ApiError> },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    pub(crate) fn from_response(endpoint: &'static str, status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_string());
        ApiError::Api {
            endpoint,
            status,
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Batch { first } => first.status(),
            _ => None,
        }
    }

    /// The access token is missing or expired.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text for the end user: the server message verbatim, otherwise a
    /// generic sentence.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Batch { .. } => BATCH_FAILURE_MESSAGE.to_string(),
            _ => GENERIC_UPSTREAM_MESSAGE.to_string(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Api {
                status, message, ..
            } => AppError::Upstream { status, message },
            ApiError::Batch { first } => AppError::Upstream {
                status: first.status().unwrap_or(502),
                message: BATCH_FAILURE_MESSAGE.to_string(),
            },
            ApiError::Config(message) => AppError::ConfigError(anyhow::anyhow!(message)),
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_kept_verbatim() {
        let err = ApiError::from_response("POST /invoices", 422, r#"{"message":"El CAE fue rechazado por AFIP"}"#);
        assert_eq!(err.user_message(), "El CAE fue rechazado por AFIP");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn surrounding_whitespace_is_not_stripped() {
        let err = ApiError::from_response("POST /companies", 409, r#"{"message":"  El CUIT ya existe \n"}"#);
        assert_eq!(err.user_message(), "  El CUIT ya existe \n");
    }

    #[test]
    fn missing_or_invalid_body_falls_back() {
        for body in ["", "<html>502</html>", r#"{"error":"x"}"#, r#"{"message":"  "}"#] {
            let err = ApiError::from_response("GET /companies", 500, body);
            assert_eq!(err.user_message(), GENERIC_UPSTREAM_MESSAGE);
        }
    }

    #[test]
    fn batch_uses_generic_message() {
        let first = ApiError::from_response("POST /tasks/:id/complete", 404, r#"{"message":"Tarea inexistente"}"#);
        let err = ApiError::Batch { first: Box::new(first) };
        assert_eq!(err.user_message(), BATCH_FAILURE_MESSAGE);
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn converts_into_upstream_app_error() {
        let err: AppError = ApiError::from_response("GET /x", 409, r#"{"message":"Duplicado"}"#).into();
        assert_eq!(err.user_message(), "Duplicado");
    }
}
