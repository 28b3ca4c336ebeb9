use api_types::error::ErrorBody;
use axum::{
    Json,
    extract::{
        Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use engine::EngineError;
use uuid::Uuid;

pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};
pub use token::TokenKeys;

mod admin;
mod auth;
mod bookings;
mod contracts;
mod disputes;
mod expenses;
mod funds;
mod groups;
mod payments;
mod reports;
mod server;
mod token;
mod usage;
mod users;
mod vehicles;
mod views;
mod votes;

/// JSON body whose rejection renders as a uniform validation error.
type JsonBody<T> = WithRejection<Json<T>, ServerError>;
/// Single `{id}` path segment.
type IdPath = WithRejection<Path<Uuid>, ServerError>;
type QueryParams<T> = WithRejection<Query<T>, ServerError>;
type Created<T> = (StatusCode, Json<T>);

/// Error returned by every handler, rendered as [`ErrorBody`].
#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed request (body, path or query) rejected before reaching the engine.
    Validation(String),
    Unauthorized(String),
}

/// Status and machine-readable code of an engine error.
fn classify(err: &EngineError) -> (StatusCode, &'static str) {
    match err {
        EngineError::InvalidInput(_)
        | EngineError::InvalidRange(_)
        | EngineError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        EngineError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        EngineError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        EngineError::KeyNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        EngineError::ExistingKey(_)
        | EngineError::Conflict(_)
        | EngineError::InsufficientFunds(_) => (StatusCode::CONFLICT, "CONFLICT_ERROR"),
        EngineError::PasswordHash(_) | EngineError::Database(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::PasswordHash(reason) => {
            tracing::error!("password hashing failed: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            ServerError::Engine(err) => {
                let (status, code) = classify(&err);
                (status, code, message_for_engine_error(err))
            }
            ServerError::Validation(message) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            ServerError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
            }
        };

        let body = ErrorBody {
            timestamp: chrono::Utc::now(),
            code: code.to_string(),
            message,
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_of(err: ServerError) -> (StatusCode, ErrorBody) {
        let res = err.into_response();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_map_to_400() {
        for err in [
            EngineError::InvalidInput("x".to_string()),
            EngineError::InvalidRange("x".to_string()),
            EngineError::InvalidAmount("x".to_string()),
        ] {
            let (status, body) = body_of(ServerError::from(err)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body.code, "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn engine_forbidden_maps_to_403() {
        let (status, body) =
            body_of(ServerError::from(EngineError::Forbidden("no".to_string()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code, "FORBIDDEN");
    }

    #[tokio::test]
    async fn engine_not_found_maps_to_404() {
        let (status, body) =
            body_of(ServerError::from(EngineError::KeyNotFound("x".to_string()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn conflicts_map_to_409() {
        for err in [
            EngineError::ExistingKey("x".to_string()),
            EngineError::Conflict("x".to_string()),
            EngineError::InsufficientFunds("x".to_string()),
        ] {
            let (status, body) = body_of(ServerError::from(err)).await;
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(body.code, "CONFLICT_ERROR");
        }
    }

    #[tokio::test]
    async fn bad_credentials_map_to_401() {
        let (status, body) = body_of(ServerError::from(EngineError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.code, "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn database_errors_hide_details() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk on fire".to_string()));
        let (status, body) = body_of(ServerError::from(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert_eq!(body.message, "internal server error");
    }

    #[tokio::test]
    async fn hashing_failures_hide_details() {
        let err = EngineError::PasswordHash("salt too short".to_string());
        let (status, body) = body_of(ServerError::from(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "internal server error");
    }
}
