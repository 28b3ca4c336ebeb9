//! Expense and expense-share API endpoints

use api_types::expense::{ExpenseCreated, ExpenseNew, ExpenseView, ShareView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{ExpenseType, MoneyCents, NewExpenseCmd, SplitMethod, User};

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

/// Record an expense and split it across the group
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<ExpenseNew>,
) -> Result<Created<ExpenseCreated>, ServerError> {
    let expense_type = ExpenseType::try_from(payload.expense_type.as_str())?;
    let split_method = SplitMethod::try_from(payload.split_method.as_str())?;
    let amount = MoneyCents::parse_positive(&payload.amount, "amount")?;

    let mut cmd = NewExpenseCmd::new(
        payload.group_id,
        expense_type,
        amount,
        payload.date,
        split_method,
    );
    if let Some(vehicle_id) = payload.vehicle_id {
        cmd = cmd.vehicle_id(vehicle_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let created = state.engine.create_expense(&user.actor(), cmd).await?;
    tracing::info!(
        expense_id = %created.expense.id,
        shares = created.shares.len(),
        "expense created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ExpenseCreated {
            expense: views::expense(created.expense),
            shares: views::list(created.shares, views::share),
        }),
    ))
}

pub async fn list_for_group(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state
        .engine
        .list_group_expenses(&user.actor(), group_id)
        .await?;
    Ok(Json(views::list(expenses, views::expense)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.get_expense(&user.actor(), id).await?;
    Ok(Json(views::expense(expense)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(&user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn approve(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.approve_expense(&user.actor(), id).await?;
    Ok(Json(views::expense(expense)))
}

pub async fn reject(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.reject_expense(&user.actor(), id).await?;
    Ok(Json(views::expense(expense)))
}

pub async fn shares(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<Vec<ShareView>>, ServerError> {
    let shares = state.engine.list_expense_shares(&user.actor(), id).await?;
    Ok(Json(views::list(shares, views::share)))
}

pub async fn my_shares(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ShareView>>, ServerError> {
    let shares = state.engine.list_my_shares(&user.actor()).await?;
    Ok(Json(views::list(shares, views::share)))
}
