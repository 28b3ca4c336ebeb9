//! Usage history (check-in / check-out) API endpoints

use api_types::usage::{CheckIn, CheckOut, UsageView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::User;

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

pub async fn check_in(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<CheckIn>,
) -> Result<Created<UsageView>, ServerError> {
    let history = state
        .engine
        .check_in(&user.actor(), payload.booking_id, payload.start_odometer)
        .await?;
    tracing::info!(booking_id = %payload.booking_id, history_id = %history.id, "vehicle checked in");
    Ok((StatusCode::CREATED, Json(views::usage(history))))
}

pub async fn check_out(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<CheckOut>,
) -> Result<Json<UsageView>, ServerError> {
    let history = state
        .engine
        .check_out(
            &user.actor(),
            id,
            payload.end_odometer,
            payload.notes.as_deref(),
        )
        .await?;
    tracing::info!(history_id = %id, distance = ?history.distance, "vehicle checked out");
    Ok(Json(views::usage(history)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<UsageView>, ServerError> {
    let history = state.engine.get_history(&user.actor(), id).await?;
    Ok(Json(views::usage(history)))
}

pub async fn mine(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UsageView>>, ServerError> {
    let histories = state.engine.list_my_history(&user.actor()).await?;
    Ok(Json(views::list(histories, views::usage)))
}

pub async fn list_for_user(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(user_id), _): IdPath,
) -> Result<Json<Vec<UsageView>>, ServerError> {
    let histories = state
        .engine
        .list_user_history(&user.actor(), user_id)
        .await?;
    Ok(Json(views::list(histories, views::usage)))
}

pub async fn list_for_vehicle(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(vehicle_id), _): IdPath,
) -> Result<Json<Vec<UsageView>>, ServerError> {
    let histories = state
        .engine
        .list_vehicle_history(&user.actor(), vehicle_id)
        .await?;
    Ok(Json(views::list(histories, views::usage)))
}
