//! Vehicle API endpoints

use api_types::vehicle::{VehicleNew, VehicleView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{NewVehicleCmd, User};

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<VehicleNew>,
) -> Result<Created<VehicleView>, ServerError> {
    let cmd = NewVehicleCmd::new(payload.group_id, payload.vin, payload.plate, payload.model);
    let vehicle = state.engine.create_vehicle(&user.actor(), cmd).await?;
    Ok((StatusCode::CREATED, Json(views::vehicle(vehicle))))
}

pub async fn list_for_group(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
) -> Result<Json<Vec<VehicleView>>, ServerError> {
    let vehicles = state.engine.list_vehicles(&user.actor(), group_id).await?;
    Ok(Json(views::list(vehicles, views::vehicle)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<VehicleView>, ServerError> {
    let vehicle = state.engine.get_vehicle(&user.actor(), id).await?;
    Ok(Json(views::vehicle(vehicle)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_vehicle(&user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
