use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::messages::BAD_REQUEST;

/// Failures from the storage layer, before a handler attaches a status message.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("pool error: {0}")]
    Pool(#[from] deadpool_sqlite::PoolError),

    #[error("interact error: {0}")]
    Interact(#[from] deadpool_sqlite::InteractError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(&'static str),

    #[error("authentication error: {0}")]
    Auth(&'static str),

    /// Any database failure. `status` is what the caller sees; `source` only
    /// goes to the log.
    #[error("store error ({status}): {source}")]
    Store {
        status: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Validation(msg) | AppError::Auth(msg) => *msg,
            AppError::Store { status, source } => {
                tracing::error!(error = %source, status = %status, "database error");
                *status
            }
        };

        let body = json!({ "status": message });
        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Attach a catalog message to a storage failure.
pub trait StoreResultExt<T> {
    fn or_status(self, status: &'static str) -> AppResult<T>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn or_status(self, status: &'static str) -> AppResult<T> {
        self.map_err(|source| AppError::Store { status, source })
    }
}

/// JSON extractor that logs deserialization errors before rejecting with a 400.
/// Drop-in replacement for `axum::Json<T>`.
///
/// Generic over the router state, so it answers with [`BAD_REQUEST`] directly;
/// the catalog's `common.bad_request` is the same string.
pub struct LoggedJson<T>(pub T);

impl<S, T> FromRequest<S> for LoggedJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(LoggedJson(value)),
            Err(rejection) => {
                tracing::warn!(
                    path = %path,
                    error = %rejection,
                    "JSON parse error (client sent malformed payload)"
                );
                Err(AppError::Validation(BAD_REQUEST))
            }
        }
    }
}

/// Query-string counterpart of [`LoggedJson`]: rejections become the JSON
/// 400 envelope instead of axum's plain-text body.
pub struct LoggedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for LoggedQuery<T>
where
    axum::extract::Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(LoggedQuery(value)),
            Err(rejection) => {
                tracing::warn!(
                    path = %parts.uri.path(),
                    error = %rejection,
                    "query parse error (client sent malformed parameters)"
                );
                Err(AppError::Validation(BAD_REQUEST))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Auth("x").status_code(), StatusCode::UNAUTHORIZED);
        let store = AppError::Store {
            status: "x",
            source: StoreError::Database(rusqlite::Error::QueryReturnedNoRows),
        };
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_or_status_keeps_message() {
        let result: Result<(), StoreError> =
            Err(StoreError::Database(rusqlite::Error::InvalidQuery));
        match result.or_status("🔴 Operation was unsuccessful!") {
            Err(AppError::Store { status, .. }) => {
                assert_eq!(status, "🔴 Operation was unsuccessful!")
            }
            other => panic!("expected store error, got {other:?}"),
        }
    }
    #[tokio::test]
    async fn test_store_error_body_hides_source() {
        let error = AppError::Store {
            status: "🔴 Error while fetching missed words",
            source: StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some("no such table: missed_words".into()),
            )),
        };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": "🔴 Error while fetching missed words" }));
        assert!(!String::from_utf8_lossy(&bytes).contains("no such table"));
    }

    #[derive(Debug, serde::Deserialize)]
    struct Paging {
        page: Option<u32>,
    }

    #[tokio::test]
    async fn test_bad_query_is_json_bad_request() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/missed?page=first")
            .body(())
            .unwrap()
            .into_parts();
        let rejected = LoggedQuery::<Paging>::from_request_parts(&mut parts, &()).await;
        match rejected {
            Err(AppError::Validation(msg)) => assert_eq!(msg, BAD_REQUEST),
            Err(other) => panic!("expected validation error, got {other:?}"),
            Ok(_) => panic!("expected rejection"),
        }

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/missed?page=2")
            .body(())
            .unwrap()
            .into_parts();
        let LoggedQuery(paging) = LoggedQuery::<Paging>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(paging.page, Some(2));
    }
}
