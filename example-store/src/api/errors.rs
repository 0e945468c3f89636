use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use super::types::{ApiResponse, MESSAGE_BAD_REQUEST, MESSAGE_INTERNAL_ERROR, MESSAGE_NOT_FOUND};
use crate::service::{ErrorKind, ExampleError};

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExampleError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status();

        let message = match kind {
            ErrorKind::InvalidInput => {
                tracing::debug!(error = %self, "Rejected request");
                MESSAGE_BAD_REQUEST.to_string()
            }
            ErrorKind::NotFound => {
                tracing::debug!(error = %self, "Example not found");
                MESSAGE_NOT_FOUND.to_string()
            }
            // details stay in the logs
            ErrorKind::InternalFailure => {
                tracing::error!(error = %self, "Request failed");
                MESSAGE_INTERNAL_ERROR.to_string()
            }
        };

        (
            status,
            Json(ApiResponse::<()>::new(status.as_u16(), message, None)),
        )
            .into_response()
    }
}

/// A panicking handler still answers with the usual 500 envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "Handler panicked");

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (
        status,
        Json(ApiResponse::<()>::new(
            status.as_u16(),
            MESSAGE_INTERNAL_ERROR,
            None,
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_per_kind() {
        let cases = [
            (
                ExampleError::InvalidInput("bad id".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ExampleError::Store(StoreError::NotFound("exmp_1".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ExampleError::Store(StoreError::Timeout),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ExampleError::Store(StoreError::Unavailable("pool closed".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ExampleError::Store(StoreError::Database(sqlx::Error::RowNotFound)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_panic_payloads_become_500() {
        let owned = handle_panic(Box::new("boom".to_string()));
        let borrowed = handle_panic(Box::new("boom"));
        let other = handle_panic(Box::new(42_u8));

        assert_eq!(owned.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(borrowed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
