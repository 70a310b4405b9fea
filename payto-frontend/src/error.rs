use askama::Template;
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use payto_client::ApiError;
use payto_core::{DraftErrors, IssuerCannotEmit, TotalsError};
use service_core::error::AppError;
use validator::ValidationErrors;

/// Region of the layout where error fragments land, so the form that
/// triggered the request stays as the user left it.
pub const FLASH_TARGET: &str = "#flash";

#[derive(Template)]
#[template(path = "fragments/error.html")]
pub struct ErrorFragment {
    pub messages: Vec<String>,
}

/// Error of an HTML handler, rendered as an error fragment.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl PageError {
    pub fn not_found(message: &str) -> Self {
        PageError(AppError::NotFound(anyhow::anyhow!(message.to_string())))
    }

    pub fn invalid(messages: Vec<String>) -> Self {
        PageError(AppError::InvalidSubmission(messages))
    }

    fn messages(&self) -> Vec<String> {
        match &self.0 {
            AppError::InvalidSubmission(messages) => messages.clone(),
            AppError::ValidationError(errors) => validation_messages(errors),
            other => vec![other.user_message()],
        }
    }
}

/// Localized messages of a `validator` failure, ordered by field name.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("Campo inválido: {field}"),
            })
        })
        .collect()
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        PageError(err.into())
    }
}

impl From<DraftErrors> for PageError {
    fn from(errors: DraftErrors) -> Self {
        PageError::invalid(errors.messages())
    }
}

impl From<TotalsError> for PageError {
    fn from(err: TotalsError) -> Self {
        PageError::invalid(vec![err.to_string()])
    }
}

impl From<IssuerCannotEmit> for PageError {
    fn from(err: IssuerCannotEmit) -> Self {
        PageError::invalid(vec![err.to_string()])
    }
}

impl From<ValidationErrors> for PageError {
    fn from(errors: ValidationErrors) -> Self {
        PageError(AppError::ValidationError(errors))
    }
}

impl From<tower_sessions::session::Error> for PageError {
    fn from(err: tower_sessions::session::Error) -> Self {
        PageError(AppError::InternalError(anyhow::Error::new(err)))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Page request failed");
        } else {
            tracing::warn!(error = %self.0, "Page request rejected");
        }

        let messages = if status == StatusCode::UNAUTHORIZED {
            vec!["Tu sesión expiró. Iniciá sesión nuevamente.".to_string()]
        } else {
            self.messages()
        };

        let mut response = (status, ErrorFragment { messages }).into_response();
        let headers = response.headers_mut();
        headers.insert("HX-Retarget", HeaderValue::from_static(FLASH_TARGET));
        headers.insert("HX-Reswap", HeaderValue::from_static("innerHTML"));
        if status == StatusCode::UNAUTHORIZED {
            headers.insert("HX-Redirect", HeaderValue::from_static("/login"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Ingresá un nombre"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn validation_messages_fall_back_to_field_name() {
        let errors = Form {
            name: String::new(),
            email: "nope".into(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            validation_messages(&errors),
            vec!["Campo inválido: email".to_string(), "Ingresá un nombre".to_string()]
        );
    }

    #[test]
    fn upstream_error_keeps_status_and_targets_flash() {
        let response = PageError(AppError::Upstream {
            status: 409,
            message: "El CUIT ya existe".into(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.headers()["HX-Retarget"], FLASH_TARGET);
        assert!(response.headers().get("HX-Redirect").is_none());
    }

    #[test]
    fn unauthorized_redirects_to_login() {
        let response = PageError(AppError::Upstream {
            status: 401,
            message: "token expired".into(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["HX-Redirect"], "/login");
    }
}
