use std::fmt::Debug;
use std::fmt::Display;

use actix_web::error::InternalError;
use actix_web::HttpResponse;
use serde::Serialize;

/// JSON error body returned on every failure path: `{"error", "message"?}`.
/// `message` is a human-readable elaboration and is omitted when empty.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(
        error: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// Convert arbitrary error types to `actix_web::Error` with HTTP 500. The
/// original cause is preserved for the log, the client only sees the generic
/// body.
pub fn error_500<T>(e: T) -> actix_web::Error
where
    T: Debug + Display + 'static,
{
    InternalError::from_response(
        e,
        HttpResponse::InternalServerError().json(ErrorBody::new("Internal server error")),
    )
    .into()
}
