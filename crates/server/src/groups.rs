//! Group and membership API endpoints

use api_types::group::{GroupNew, GroupView, MemberNew, MemberUpdate, MemberView, OwnerTransfer};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::User;
use uuid::Uuid;

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

type MemberPath = WithRejection<Path<(Uuid, Uuid)>, ServerError>;

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<GroupNew>,
) -> Result<Created<GroupView>, ServerError> {
    let group = state
        .engine
        .create_group(&user.actor(), &payload.name)
        .await?;
    tracing::info!(group_id = %group.id, "group created");
    Ok((StatusCode::CREATED, Json(views::group(group))))
}

/// Groups the caller belongs to; every group for admins
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GroupView>>, ServerError> {
    let groups = state.engine.list_groups(&user.actor()).await?;
    Ok(Json(views::list(groups, views::group)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.get_group(&user.actor(), id).await?;
    Ok(Json(views::group(group)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(&user.actor(), id).await?;
    tracing::info!(group_id = %id, "group deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<Vec<MemberView>>, ServerError> {
    let members = state.engine.list_members(&user.actor(), id).await?;
    Ok(Json(views::list(members, views::member)))
}

pub async fn add_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<MemberNew>,
) -> Result<Created<MemberView>, ServerError> {
    let member = state
        .engine
        .add_member(&user.actor(), id, payload.user_id, payload.percentage)
        .await?;
    Ok((StatusCode::CREATED, Json(views::member(member))))
}

pub async fn update_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path((id, user_id)), _): MemberPath,
    WithRejection(Json(payload), _): JsonBody<MemberUpdate>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state
        .engine
        .update_member_share(&user.actor(), id, user_id, payload.percentage)
        .await?;
    Ok(Json(views::member(member)))
}

pub async fn remove_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path((id, user_id)), _): MemberPath,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_member(&user.actor(), id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn transfer_owner(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<OwnerTransfer>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state
        .engine
        .transfer_ownership(&user.actor(), id, payload.new_owner_id)
        .await?;
    tracing::info!(group_id = %id, new_owner = %payload.new_owner_id, "group ownership transferred");
    Ok(Json(views::group(group)))
}
