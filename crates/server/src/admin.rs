//! Admin-only listings of every record of a kind

use api_types::{
    booking::BookingView, expense::ExpenseView, group::GroupView, payment::PaymentView,
    user::UserView, vehicle::VehicleView,
};
use axum::{Extension, Json, extract::State};
use engine::{Action, User};

use crate::{ServerError, server::ServerState, views};

pub async fn users(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users(&user.actor()).await?;
    Ok(Json(views::list(users, views::user)))
}

pub async fn groups(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GroupView>>, ServerError> {
    // list_groups alone would answer non-admins with their own groups.
    let actor = user.actor();
    actor.require(Action::AdminListing)?;
    let groups = state.engine.list_groups(&actor).await?;
    Ok(Json(views::list(groups, views::group)))
}

pub async fn vehicles(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<VehicleView>>, ServerError> {
    let vehicles = state.engine.list_all_vehicles(&user.actor()).await?;
    Ok(Json(views::list(vehicles, views::vehicle)))
}

pub async fn bookings(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BookingView>>, ServerError> {
    let bookings = state.engine.list_all_bookings(&user.actor()).await?;
    Ok(Json(views::list(bookings, views::booking)))
}

pub async fn expenses(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_all_expenses(&user.actor()).await?;
    Ok(Json(views::list(expenses, views::expense)))
}

pub async fn payments(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PaymentView>>, ServerError> {
    let payments = state.engine.list_all_payments(&user.actor()).await?;
    Ok(Json(views::list(payments, views::payment)))
}
