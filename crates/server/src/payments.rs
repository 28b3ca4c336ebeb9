//! Payment API endpoints

use api_types::payment::{PaymentNew, PaymentStatusUpdate, PaymentView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{MoneyCents, PayShareCmd, PaymentMethod, PaymentStatus, User};

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

/// Pay (part of) the caller's own expense share
pub async fn pay(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<PaymentNew>,
) -> Result<Created<PaymentView>, ServerError> {
    let amount = MoneyCents::parse_positive(&payload.amount, "amount")?;
    let method = PaymentMethod::try_from(payload.method.as_str())?;
    let mut cmd = PayShareCmd::new(payload.expense_share_id, amount, method);
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let payment = state.engine.pay_share(&user.actor(), cmd).await?;
    tracing::info!(
        payment_id = %payment.id,
        share_id = %payment.expense_share_id,
        amount = %payment.amount,
        "share paid"
    );
    Ok((StatusCode::CREATED, Json(views::payment(payment))))
}

pub async fn mine(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PaymentView>>, ServerError> {
    let payments = state.engine.list_my_payments(&user.actor()).await?;
    Ok(Json(views::list(payments, views::payment)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<PaymentView>, ServerError> {
    let payment = state.engine.get_payment(&user.actor(), id).await?;
    Ok(Json(views::payment(payment)))
}

/// Payments recorded against one expense share
pub async fn list_for_share(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<Vec<PaymentView>>, ServerError> {
    let payments = state.engine.list_share_payments(&user.actor(), id).await?;
    Ok(Json(views::list(payments, views::payment)))
}

pub async fn update_status(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<PaymentStatusUpdate>,
) -> Result<Json<PaymentView>, ServerError> {
    let status = PaymentStatus::try_from(payload.status.as_str())?;
    let payment = state
        .engine
        .update_payment_status(&user.actor(), id, status)
        .await?;
    Ok(Json(views::payment(payment)))
}
