//! Mapping service errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::fare::FareError;
use crate::planner::SearchError;
use crate::service::ServiceError;

use super::dto::ErrorResponse;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Timeout { message: String },
    Unavailable { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Timeout { message }
            | AppError::Unavailable { message } => message,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::InvalidInput(_)
            | ServiceError::Search(SearchError::InvalidInput(_))
            | ServiceError::Fare(FareError::InvalidInput(_))
            | ServiceError::Fare(FareError::InvalidRange(_)) => AppError::BadRequest { message },

            ServiceError::NotFound(_)
            | ServiceError::Search(SearchError::NotFound(_))
            | ServiceError::Search(SearchError::NoPathFound { .. })
            | ServiceError::Fare(FareError::NotFoundOnRoute { .. }) => AppError::NotFound { message },

            ServiceError::Search(SearchError::Timeout) => AppError::Timeout { message },

            ServiceError::SnapshotUnavailable(_) | ServiceError::SearchAborted(_) => {
                AppError::Unavailable { message }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(%status, error = self.message(), "Request failed");
        } else {
            debug!(%status, error = self.message(), "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotError;

    fn status_of(e: ServiceError) -> StatusCode {
        AppError::from(e).into_response().status()
    }

    #[test]
    fn client_errors() {
        assert_eq!(
            status_of(ServiceError::InvalidInput("lat".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SearchError::InvalidInput("same stop".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(FareError::InvalidRange(1).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_errors() {
        assert_eq!(
            status_of(SearchError::NotFound("Atlantis".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                SearchError::NoPathFound {
                    from: "A".into(),
                    to: "B".into()
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                FareError::NotFoundOnRoute {
                    route: "5".into(),
                    stop: "Z".into()
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::NotFound("route 999".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn server_errors() {
        assert_eq!(
            status_of(SearchError::Timeout.into()),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(SnapshotError::Empty.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn aborted_search_is_unavailable() {
        let handle: tokio::task::JoinHandle<()> = tokio::spawn(async { panic!("search task died") });
        let join_error = handle.await.unwrap_err();

        assert_eq!(
            status_of(ServiceError::SearchAborted(join_error)),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn body_carries_message() {
        let response = AppError::from(ServiceError::NotFound("route 999".into())).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body.error, "not found: route 999");
    }
}
