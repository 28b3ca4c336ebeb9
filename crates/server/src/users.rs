//! User API endpoints

use api_types::user::{Register, UserView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::User;

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

/// Self-service sign up. New accounts are co-owners.
pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<Register>,
) -> Result<Created<UserView>, ServerError> {
    let user = state
        .engine
        .register_user(&payload.username, &payload.email, &payload.password)
        .await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(views::user(user))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<UserView>, ServerError> {
    let found = state.engine.get_user(&user.actor(), id).await?;
    Ok(Json(views::user(found)))
}
