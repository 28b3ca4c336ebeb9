//! Dispute API endpoints

use api_types::dispute::{DisputeNew, DisputeResolve, DisputeView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{DisputeCategory, NewDisputeCmd, User};

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

pub async fn open(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<DisputeNew>,
) -> Result<Created<DisputeView>, ServerError> {
    let mut cmd = NewDisputeCmd::new(payload.group_id, payload.title, payload.description);
    if let Some(category) = payload.category {
        cmd = cmd.category(DisputeCategory::try_from(category.as_str())?);
    }
    if let Some(booking_id) = payload.related_booking_id {
        cmd = cmd.related_booking(booking_id);
    }
    if let Some(expense_id) = payload.related_expense_id {
        cmd = cmd.related_expense(expense_id);
    }

    let dispute = state.engine.open_dispute(&user.actor(), cmd).await?;
    tracing::info!(dispute_id = %dispute.id, group_id = %dispute.group_id, "dispute opened");
    Ok((StatusCode::CREATED, Json(views::dispute(dispute))))
}

/// Every dispute (staff)
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<DisputeView>>, ServerError> {
    let disputes = state.engine.list_disputes(&user.actor()).await?;
    Ok(Json(views::list(disputes, views::dispute)))
}

pub async fn list_open(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<DisputeView>>, ServerError> {
    let disputes = state.engine.list_open_disputes(&user.actor()).await?;
    Ok(Json(views::list(disputes, views::dispute)))
}

pub async fn list_for_group(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
) -> Result<Json<Vec<DisputeView>>, ServerError> {
    let disputes = state
        .engine
        .list_group_disputes(&user.actor(), group_id)
        .await?;
    Ok(Json(views::list(disputes, views::dispute)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<DisputeView>, ServerError> {
    let dispute = state.engine.get_dispute(&user.actor(), id).await?;
    Ok(Json(views::dispute(dispute)))
}

pub async fn review(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<DisputeView>, ServerError> {
    let dispute = state.engine.review_dispute(&user.actor(), id).await?;
    Ok(Json(views::dispute(dispute)))
}

pub async fn resolve(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<DisputeResolve>,
) -> Result<Json<DisputeView>, ServerError> {
    let dispute = state
        .engine
        .resolve_dispute(&user.actor(), id, &payload.resolution)
        .await?;
    Ok(Json(views::dispute(dispute)))
}

pub async fn close(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<DisputeView>, ServerError> {
    let dispute = state.engine.close_dispute(&user.actor(), id).await?;
    Ok(Json(views::dispute(dispute)))
}
