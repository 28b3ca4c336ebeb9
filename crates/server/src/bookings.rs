//! Booking API endpoints

use api_types::booking::{BookingNew, BookingStatusUpdate, BookingView, PriorityView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{BookingStatus, User};

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

/// Reserve a vehicle. Overlapping reservations are rejected with 409.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<BookingNew>,
) -> Result<Created<BookingView>, ServerError> {
    let booking = state
        .engine
        .create_booking(
            &user.actor(),
            payload.vehicle_id,
            payload.start_time,
            payload.end_time,
        )
        .await?;
    tracing::info!(booking_id = %booking.id, vehicle_id = %booking.vehicle_id, "booking created");
    Ok((StatusCode::CREATED, Json(views::booking(booking))))
}

pub async fn mine(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BookingView>>, ServerError> {
    let bookings = state.engine.list_my_bookings(&user.actor()).await?;
    Ok(Json(views::list(bookings, views::booking)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<BookingView>, ServerError> {
    let booking = state.engine.get_booking(&user.actor(), id).await?;
    Ok(Json(views::booking(booking)))
}

pub async fn cancel(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<BookingView>, ServerError> {
    let booking = state.engine.cancel_booking(&user.actor(), id).await?;
    Ok(Json(views::booking(booking)))
}

pub async fn update_status(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<BookingStatusUpdate>,
) -> Result<Json<BookingView>, ServerError> {
    let status = BookingStatus::try_from(payload.status.as_str())?;
    let booking = state
        .engine
        .update_booking_status(&user.actor(), id, status)
        .await?;
    Ok(Json(views::booking(booking)))
}

pub async fn list_for_vehicle(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(vehicle_id), _): IdPath,
) -> Result<Json<Vec<BookingView>>, ServerError> {
    let bookings = state
        .engine
        .list_vehicle_bookings(&user.actor(), vehicle_id)
        .await?;
    Ok(Json(views::list(bookings, views::booking)))
}

/// Caller's advisory booking priority within a group
pub async fn priority(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
) -> Result<Json<PriorityView>, ServerError> {
    let priority = state
        .engine
        .booking_priority(&user.actor(), group_id)
        .await?;
    Ok(Json(views::priority(priority)))
}
