use std::collections::BTreeMap;
use std::result;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use common::http::ApiError;
use metadata::error::MetadataError;
use thiserror::Error;

use crate::registrations::DenialReason;

pub type Result<T> = result::Result<T, PlatformError>;

/// Code carried by `409 Conflict` when the caller already holds a record for
/// the event. The record id goes into the `attendanceId` field. Denial reasons
/// use their own codes.
pub const ALREADY_REGISTERED_CODE: u64 = 100;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("password hashing error")]
    InvalidPasswordHashing,
    #[error("can't make access token")]
    CantMakeAccessToken,
    #[error("can't make refresh token")]
    CantMakeRefreshToken,
    #[error("can't parse bearer header")]
    CantParseBearerHeader,
    #[error("can't parse access token")]
    CantParseAccessToken,
}

/// Business-rule failures of the registration mutators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("{0}")]
    Denied(DenialReason),
    #[error("already registered for this event (attendance {0})")]
    AlreadyRegistered(u64),
    #[error("{}", DenialReason::LoginRequired)]
    Unauthenticated,
}

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{1:?} error wrapped into {0:?}")]
    Wrapped(Box<PlatformError>, Box<PlatformError>),
    #[error("invalid fields")]
    InvalidFields(BTreeMap<String, String>),
    #[error("bad request: {0:?}")]
    BadRequest(String),
    #[error("unauthorized: {0:?}")]
    Unauthorized(String),
    #[error("forbidden: {0:?}")]
    Forbidden(String),
    #[error("not found: {0:?}")]
    NotFound(String),
    #[error("already exists: {0:?}")]
    AlreadyExists(String),
    #[error("internal: {0:?}")]
    Internal(String),
    #[error("registration: {0}")]
    Registration(#[from] RegistrationError),
    #[error("serde: {0:?}")]
    Serde(#[from] serde_json::Error),
    #[error("password hash")]
    PasswordHash(#[from] password_hash::Error),
    #[error("jsonwebtoken: {0:?}")]
    JSONWebToken(#[from] jsonwebtoken::errors::Error),
    #[error("metadata: {0:?}")]
    Metadata(#[from] MetadataError),
    #[error("session: {0:?}")]
    Auth(#[from] AuthError),
    #[error("reqwest: {0:?}")]
    Reqwest(#[from] reqwest::Error),
    #[error("other: {0:?}")]
    Other(#[from] anyhow::Error),
}

impl PlatformError {
    pub fn wrap_into(self, err: impl Into<PlatformError>) -> PlatformError {
        PlatformError::Wrapped(Box::new(self), Box::new(err.into()))
    }

    pub fn invalid_field(field: impl Into<String>, error: impl Into<String>) -> PlatformError {
        PlatformError::InvalidFields(BTreeMap::from([(field.into(), error.into())]))
    }

    pub fn into_api_error(self) -> ApiError {
        match self {
            PlatformError::Serde(err) => ApiError::bad_request(err.to_string()),
            PlatformError::Metadata(err) => match err {
                MetadataError::AlreadyExists(_) => ApiError::conflict(err.to_string()),
                MetadataError::NotFound(_) => ApiError::not_found(err.to_string()),
                MetadataError::RocksDb(_) if err.is_busy() => {
                    ApiError::internal("resource is busy, try again")
                }
                MetadataError::Internal(_)
                | MetadataError::RocksDb(_)
                | MetadataError::FromUtf8(_)
                | MetadataError::Bincode(_)
                | MetadataError::Io(_)
                | MetadataError::Other(_) => ApiError::internal(err.to_string()),
            },
            PlatformError::Registration(err) => match err {
                RegistrationError::Denied(reason) => {
                    let status = match reason {
                        DenialReason::LoginRequired => StatusCode::UNAUTHORIZED,
                        DenialReason::NotAMember => StatusCode::FORBIDDEN,
                        _ => StatusCode::UNPROCESSABLE_ENTITY,
                    };
                    ApiError::new(status)
                        .with_code(reason.code())
                        .with_message(reason.to_string())
                }
                RegistrationError::AlreadyRegistered(attendance_id) => ApiError::conflict(err)
                    .with_code(ALREADY_REGISTERED_CODE)
                    .with_fields(BTreeMap::from([(
                        "attendanceId".to_string(),
                        attendance_id.to_string(),
                    )])),
                RegistrationError::Unauthenticated => ApiError::unauthorized(err)
                    .with_code(DenialReason::LoginRequired.code()),
            },
            PlatformError::BadRequest(msg) => ApiError::bad_request(msg),
            PlatformError::Internal(msg) => ApiError::internal(msg),
            PlatformError::Auth(err) => match err {
                AuthError::InvalidCredentials => ApiError::unauthorized(err),
                AuthError::InvalidRefreshToken => ApiError::unauthorized(err),
                AuthError::InvalidPasswordHashing => ApiError::internal(err),
                AuthError::CantMakeAccessToken => ApiError::internal(err),
                AuthError::CantMakeRefreshToken => ApiError::internal(err),
                AuthError::CantParseBearerHeader => ApiError::unauthorized(err),
                AuthError::CantParseAccessToken => ApiError::unauthorized(err),
            },
            PlatformError::Unauthorized(err) => ApiError::unauthorized(err),
            PlatformError::Forbidden(err) => ApiError::forbidden(err),
            PlatformError::NotFound(err) => ApiError::not_found(err),
            PlatformError::AlreadyExists(err) => ApiError::conflict(err),
            PlatformError::PasswordHash(err) => ApiError::internal(err.to_string()),
            PlatformError::JSONWebToken(err) => ApiError::internal(err.to_string()),
            PlatformError::Reqwest(err) => ApiError::internal(err.to_string()),
            PlatformError::Other(err) => ApiError::internal(err.to_string()),
            PlatformError::Wrapped(_, outer) => outer.into_api_error(),
            PlatformError::InvalidFields(fields) => {
                ApiError::new(StatusCode::BAD_REQUEST).with_fields(fields)
            }
        }
    }
}

/// Collects per-field validation failures into one
/// [`PlatformError::InvalidFields`].
#[derive(Default)]
pub struct ValidationError {
    fields: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, err: impl Into<String>) {
        self.fields.insert(field.into(), err.into());
    }

    pub fn result(self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(PlatformError::InvalidFields(self.fields))
        }
    }
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        self.into_api_error().into_response()
    }
}
