//! Common fund API endpoints

use api_types::fund::{FundMovement, FundNew, FundTransactionView, FundView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{FundMovementCmd, FundType, MoneyCents, NewFundCmd, User};
use uuid::Uuid;

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

fn movement(fund_id: Uuid, payload: FundMovement) -> Result<FundMovementCmd, ServerError> {
    let amount = MoneyCents::parse_positive(&payload.amount, "amount")?;
    let mut cmd = FundMovementCmd::new(fund_id, amount);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(reference) = payload.reference {
        cmd = cmd.reference(reference);
    }
    Ok(cmd)
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<FundNew>,
) -> Result<Created<FundView>, ServerError> {
    let cmd = NewFundCmd {
        group_id: payload.group_id,
        fund_type: FundType::try_from(payload.fund_type.as_str())?,
        description: payload.description,
    };
    let fund = state.engine.create_fund(&user.actor(), cmd).await?;
    Ok((StatusCode::CREATED, Json(views::fund(fund))))
}

pub async fn list_for_group(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
) -> Result<Json<Vec<FundView>>, ServerError> {
    let funds = state
        .engine
        .list_group_funds(&user.actor(), group_id)
        .await?;
    Ok(Json(views::list(funds, views::fund)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<FundView>, ServerError> {
    let fund = state.engine.get_fund(&user.actor(), id).await?;
    Ok(Json(views::fund(fund)))
}

pub async fn deposit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<FundMovement>,
) -> Result<Json<FundView>, ServerError> {
    let fund = state
        .engine
        .deposit(&user.actor(), movement(id, payload)?)
        .await?;
    tracing::info!(fund_id = %id, balance = %fund.balance, "fund deposit");
    Ok(Json(views::fund(fund)))
}

/// Take money out of a fund. A withdrawal larger than the balance is a 409.
pub async fn withdraw(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<FundMovement>,
) -> Result<Json<FundView>, ServerError> {
    let fund = state
        .engine
        .withdraw(&user.actor(), movement(id, payload)?)
        .await?;
    tracing::info!(fund_id = %id, balance = %fund.balance, "fund withdrawal");
    Ok(Json(views::fund(fund)))
}

pub async fn transactions(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<Vec<FundTransactionView>>, ServerError> {
    let txs = state
        .engine
        .list_fund_transactions(&user.actor(), id)
        .await?;
    Ok(Json(views::list(txs, views::fund_transaction)))
}
