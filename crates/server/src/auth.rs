//! Login and current-user endpoints

use api_types::{
    auth::{Login, LoginResponse},
    user::UserView,
};
use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;
use engine::User;

use crate::{JsonBody, ServerError, server::ServerState, views};

/// Exchange email and password for a bearer token
pub async fn login(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<Login>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let (token, expires_at) = state.tokens.issue(&user.email, chrono::Utc::now());
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at,
        user: views::user(user),
    }))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(views::user(user))
}
