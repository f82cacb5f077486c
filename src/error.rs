use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::env;
use std::fmt::{self, Debug, Display};

pub const START_POSE_ERROR_MESSAGE: &str =
    "Start latitude and longitude must be between -90 - 90 and -180 to 180 degrees respectively";
pub const END_POSE_ERROR_MESSAGE: &str =
    "End latitude and longitude must be between -90 - 90 and -180 to 180 degrees respectively";
pub const RIDER_NAME_ERROR_MESSAGE: &str = "Rider name must be a non empty string";
pub const DRIVER_NAME_ERROR_MESSAGE: &str = "Driver name must be a non empty string";
pub const VEHICLE_NAME_ERROR_MESSAGE: &str = "Vehicle name must be a non empty string";
pub const RIDES_NOT_FOUND_MESSAGE: &str = "Could not find any rides";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    ServerError,
    RidesNotFoundError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::RidesNotFoundError => "RIDES_NOT_FOUND_ERROR",
        }
    }
}

/// Every failure a request can end in. Rendered as `{error_code, message}`.
#[derive(Clone, Debug, Serialize)]
pub struct Error {
    #[serde(rename = "error_code")]
    pub code: ErrorCode,
    pub message: String,
}

#[cfg(test)]
impl Error {
    pub fn is_validation_error(&self) -> bool {
        self.code == ErrorCode::ValidationError
    }

    pub fn is_not_found_error(&self) -> bool {
        self.code == ErrorCode::RidesNotFoundError
    }

    pub fn is_server_error(&self) -> bool {
        self.code == ErrorCode::ServerError
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

// Clients always get a 200; the error code is the only discriminator.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!(error_code = self.code.as_str(), "{}", self.message);

        (StatusCode::OK, Json(self)).into_response()
    }
}

pub fn validation_error(message: &str) -> Error {
    Error {
        code: ErrorCode::ValidationError,
        message: message.into(),
    }
}

pub fn rides_not_found_error() -> Error {
    Error {
        code: ErrorCode::RidesNotFoundError,
        message: RIDES_NOT_FOUND_MESSAGE.into(),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!(cause = ?err, "database error");

    Error {
        code: ErrorCode::ServerError,
        message: UNKNOWN_ERROR_MESSAGE.into(),
    }
}

pub fn env_var_error(err: env::VarError) -> Error {
    Error {
        code: ErrorCode::ServerError,
        message: format!("environment variable error: {}", err),
    }
}

pub fn invalid_config_error(key: &str) -> Error {
    Error {
        code: ErrorCode::ServerError,
        message: format!("invalid value for {}", key),
    }
}

pub fn unexpected_error<T: Display>(err: T) -> Error {
    tracing::error!(cause = %err, "unexpected error");

    Error {
        code: ErrorCode::ServerError,
        message: UNKNOWN_ERROR_MESSAGE.into(),
    }
}

#[test]
fn error_code_serializes_as_wire_name() {
    let body = serde_json::to_value(validation_error(RIDER_NAME_ERROR_MESSAGE)).unwrap();

    assert_eq!(
        body,
        serde_json::json!({
            "error_code": "VALIDATION_ERROR",
            "message": "Rider name must be a non empty string",
        })
    );

    let body = serde_json::to_value(rides_not_found_error()).unwrap();
    assert_eq!(body["error_code"], "RIDES_NOT_FOUND_ERROR");
    assert_eq!(body["message"], "Could not find any rides");
}

#[test]
fn database_error_hides_cause() {
    let err: Error = sqlx::Error::RowNotFound.into();

    assert!(err.is_server_error());
    assert_eq!(err.message, "Unknown error");
}

#[test]
fn error_response_is_ok_status() {
    use axum::body::HttpBody;
    use tokio_test::block_on;

    let response = database_error("disk full").into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = block_on(response.into_body().data()).unwrap().unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error_code"], "SERVER_ERROR");
    assert_eq!(body["message"], "Unknown error");
}
