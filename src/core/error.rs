// Centralized error handling for the booking API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::security::session::clear_session;

const GENERIC_FAILURE: &str = "Something went wrong";

/// A single failed field check, shaped like the validator output the frontend reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct FieldError {
    pub path: String,
    pub msg: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, path: &str, msg: &str) {
        self.0.push(FieldError {
            path: path.to_string(),
            msg: msg.to_string(),
        });
    }

    pub fn single(path: &str, msg: &str) -> Self {
        let mut errors = Self::new();
        errors.push(path, msg);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": self.0 }))).into_response()
    }
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Token verification failures are deliberately a single kind: callers must not
/// learn whether a token was malformed, forged or expired.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Rejection produced by the session gate
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionRejection {
    #[error("No session cookie")]
    MissingCookie,

    #[error("Session token rejected")]
    InvalidToken,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let body = (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "unauthorized" })),
        );

        match self {
            SessionRejection::MissingCookie => body.into_response(),
            SessionRejection::InvalidToken => {
                (clear_session(CookieJar::new()), body).into_response()
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Failed to persist record: {0}")]
    Persistence(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Token creation failed: {0}")]
    TokenCreation(#[from] TokenError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => AuthError::UserAlreadyExists,
            StoreError::Persistence(e) => AuthError::Internal(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Validation(errors) => errors.into_response(),
            AuthError::UserAlreadyExists
            | AuthError::InvalidCredentials
            | AuthError::UserNotFound => message_response(StatusCode::BAD_REQUEST, &self.to_string()),
            AuthError::TokenCreation(_) | AuthError::Internal(_) => {
                error!(error = %self, "Account request failed");
                message_response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
            }
        }
    }
}

/// Failure of an ingestion batch. The whole batch fails when any single upload does.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Upload of image {index} failed: {source}")]
    Upload {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Error, Debug)]
pub enum HotelError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Malformed form data: {0}")]
    MalformedForm(String),

    #[error("Hotel not found")]
    NotFound,

    #[error(transparent)]
    Ingestion(#[from] IngestError),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for HotelError {
    fn into_response(self) -> Response {
        match self {
            HotelError::Validation(errors) => errors.into_response(),
            HotelError::MalformedForm(_) => {
                message_response(StatusCode::BAD_REQUEST, &self.to_string())
            }
            HotelError::NotFound => message_response(StatusCode::NOT_FOUND, "Hotel not found"),
            HotelError::Ingestion(_) | HotelError::Store(_) => {
                error!(error = %self, "Hotel request failed");
                message_response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl IntoResponse for MonitoringError {
    fn into_response(self) -> Response {
        match self {
            MonitoringError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        }
    }
}
