//! Report API endpoints

use api_types::report::{
    DateRange, FinancialReportView, UsageReportView, UserExpenseReportView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use engine::User;

use crate::{IdPath, QueryParams, ServerError, server::ServerState, views};

/// Expense totals of a group, `?from=YYYY-MM-DD&to=YYYY-MM-DD` (both required)
pub async fn group_financial(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
    WithRejection(Query(range), _): QueryParams<DateRange>,
) -> Result<Json<FinancialReportView>, ServerError> {
    let (Some(from), Some(to)) = (range.from, range.to) else {
        return Err(ServerError::Validation(
            "query parameters `from` and `to` are required".to_string(),
        ));
    };
    let report = state
        .engine
        .group_financial_report(&user.actor(), group_id, from, to)
        .await?;
    Ok(Json(views::financial_report(report)))
}

/// What a user owes and has paid, optionally limited to `?from&to`
pub async fn user_expenses(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(user_id), _): IdPath,
    WithRejection(Query(range), _): QueryParams<DateRange>,
) -> Result<Json<UserExpenseReportView>, ServerError> {
    let report = state
        .engine
        .user_expense_report(&user.actor(), user_id, range.from, range.to)
        .await?;
    Ok(Json(views::user_report(report)))
}

pub async fn usage_vs_ownership(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
) -> Result<Json<UsageReportView>, ServerError> {
    let report = state
        .engine
        .usage_vs_ownership(&user.actor(), group_id)
        .await?;
    Ok(Json(views::usage_report(report)))
}
