//! E-contract API endpoints

use api_types::contract::{ContractNew, ContractView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{NewContractCmd, User};

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<ContractNew>,
) -> Result<Created<ContractView>, ServerError> {
    let cmd = NewContractCmd {
        group_id: payload.group_id,
        contract_no: payload.contract_no,
        start_date: payload.start_date,
        end_date: payload.end_date,
        terms: payload.terms,
        document_url: payload.document_url,
    };
    let contract = state.engine.create_contract(&user.actor(), cmd).await?;
    Ok((StatusCode::CREATED, Json(views::contract(contract))))
}

pub async fn list_for_group(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
) -> Result<Json<Vec<ContractView>>, ServerError> {
    let contracts = state
        .engine
        .list_group_contracts(&user.actor(), group_id)
        .await?;
    Ok(Json(views::list(contracts, views::contract)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ContractView>, ServerError> {
    let contract = state.engine.get_contract(&user.actor(), id).await?;
    Ok(Json(views::contract(contract)))
}

pub async fn sign(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ContractView>, ServerError> {
    let contract = state.engine.sign_contract(&user.actor(), id).await?;
    tracing::info!(contract_id = %id, "contract signed");
    Ok(Json(views::contract(contract)))
}
