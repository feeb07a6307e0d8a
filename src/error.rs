//! Error types for the registration endpoint.
//!
//! Every error is terminal for the request. The `Display` text is the exact
//! plain-text body sent to the client.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

/// Field rule that rejected a registration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    Username,
    Email,
    Password,
}

impl ValidationFailure {
    /// Order in which field rules are reported.
    pub const ORDER: [Self; 3] = [Self::Username, Self::Email, Self::Password];

    pub fn field(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Username => "Username must be between 3 and 255 characters",
            Self::Email => "Invalid email address",
            Self::Password => "Password must be between 6 and 128 characters",
        }
    }

    /// Picks the first failing field in report order.
    pub fn first_of(errors: &ValidationErrors) -> Option<Self> {
        let failed = errors.errors();
        Self::ORDER
            .into_iter()
            .find(|failure| failed.contains_key(failure.field()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body could not be read or decoded as a registration payload.
    #[error("Invalid JSON")]
    MalformedInput,

    #[error("{}", .0.message())]
    Validation(ValidationFailure),
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MalformedInput | Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ValidationErrors> for RegistrationError {
    fn from(errors: ValidationErrors) -> Self {
        // validate() only reports the three declared fields
        let failure = ValidationFailure::first_of(&errors).unwrap_or(ValidationFailure::Username);
        Self::Validation(failure)
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            self.to_string(),
        )
            .into_response()
    }
}
