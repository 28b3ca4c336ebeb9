use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Action, Actor, Booking, BookingStatus, EngineError, PriorityLevel, ResultEngine, bookings,
    ensure_valid_range, overlaps, ownership_shares, priority,
};

use super::{Engine, with_tx};

/// Window of past bookings counted as recent usage.
pub(super) const USAGE_WINDOW_DAYS: i64 = 30;

/// Advisory booking priority of one member within a group.
#[derive(Clone, Debug, PartialEq)]
pub struct BookingPriority {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub ownership_pct: f64,
    pub user_usage_minutes: i64,
    pub group_usage_minutes: i64,
    pub score: f64,
    pub level: PriorityLevel,
}

fn to_bookings(models: Vec<bookings::Model>) -> ResultEngine<Vec<Booking>> {
    models.into_iter().map(Booking::try_from).collect()
}

impl Engine {
    /// Reserves a vehicle for `[start, end)`.
    ///
    /// The interval must lie in the future, the actor must belong to the
    /// vehicle's group and no pending or confirmed booking of the vehicle may
    /// overlap it. New bookings are confirmed immediately.
    pub async fn create_booking(
        &self,
        actor: &Actor,
        vehicle_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Booking> {
        actor.require(Action::CreateBooking)?;
        ensure_valid_range(start, end)?;
        let now = self.now();
        if start <= now {
            return Err(EngineError::InvalidInput(
                "booking must start in the future".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            let group = self
                .require_group_member(&db_tx, vehicle.group_id, actor)
                .await?;

            let existing = bookings::Entity::find()
                .filter(bookings::Column::VehicleId.eq(vehicle_id))
                .filter(bookings::Column::Status.ne(BookingStatus::Cancelled.as_str()))
                .all(&db_tx)
                .await?;
            let reservations = to_bookings(existing)?
                .iter()
                .map(Booking::reservation)
                .collect::<Vec<_>>();
            if overlaps(&reservations, start, end)? {
                return Err(EngineError::Conflict(
                    "vehicle is already booked for this period".to_string(),
                ));
            }

            let model = bookings::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group.id),
                vehicle_id: ActiveValue::Set(vehicle.id),
                user_id: ActiveValue::Set(actor.user_id),
                start_time: ActiveValue::Set(start),
                end_time: ActiveValue::Set(end),
                status: ActiveValue::Set(BookingStatus::Confirmed.as_str().to_string()),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Booking::try_from(model)
        })
    }

    /// Cancels one of the actor's bookings before it starts.
    pub async fn cancel_booking(&self, actor: &Actor, booking_id: Uuid) -> ResultEngine<Booking> {
        with_tx!(self, |db_tx| {
            let model = self.require_booking(&db_tx, booking_id).await?;
            if model.user_id != actor.user_id {
                return Err(EngineError::Forbidden(
                    "only the booking owner can cancel it".to_string(),
                ));
            }
            let booking = Booking::try_from(model.clone())?;
            if booking.status == BookingStatus::Cancelled {
                return Err(EngineError::Conflict("booking already cancelled".to_string()));
            }
            if booking.start_time <= self.now() {
                return Err(EngineError::Conflict(
                    "booking has already started".to_string(),
                ));
            }

            let mut active: bookings::ActiveModel = model.into();
            active.status = ActiveValue::Set(BookingStatus::Cancelled.as_str().to_string());
            Booking::try_from(active.update(&db_tx).await?)
        })
    }

    /// Moves a booking along its lifecycle (staff only).
    pub async fn update_booking_status(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> ResultEngine<Booking> {
        actor.require(Action::UpdateBookingStatus)?;
        with_tx!(self, |db_tx| {
            let model = self.require_booking(&db_tx, booking_id).await?;
            let current = BookingStatus::try_from(model.status.as_str())?;
            if !current.can_transition_to(status) {
                return Err(EngineError::Conflict(format!(
                    "cannot move booking from {} to {}",
                    current.as_str(),
                    status.as_str()
                )));
            }
            let mut active: bookings::ActiveModel = model.into();
            active.status = ActiveValue::Set(status.as_str().to_string());
            Booking::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn get_booking(&self, actor: &Actor, booking_id: Uuid) -> ResultEngine<Booking> {
        with_tx!(self, |db_tx| {
            let model = self.require_booking(&db_tx, booking_id).await?;
            if model.user_id != actor.user_id {
                self.require_group_access(&db_tx, model.group_id, actor)
                    .await?;
            }
            Booking::try_from(model)
        })
    }

    /// The actor's bookings, latest start first.
    pub async fn list_my_bookings(&self, actor: &Actor) -> ResultEngine<Vec<Booking>> {
        with_tx!(self, |db_tx| {
            let models = bookings::Entity::find()
                .filter(bookings::Column::UserId.eq(actor.user_id))
                .order_by_desc(bookings::Column::StartTime)
                .all(&db_tx)
                .await?;
            to_bookings(models)
        })
    }

    /// Bookings of a vehicle in start order.
    pub async fn list_vehicle_bookings(
        &self,
        actor: &Actor,
        vehicle_id: Uuid,
    ) -> ResultEngine<Vec<Booking>> {
        with_tx!(self, |db_tx| {
            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            self.require_group_access(&db_tx, vehicle.group_id, actor)
                .await?;
            let models = bookings::Entity::find()
                .filter(bookings::Column::VehicleId.eq(vehicle_id))
                .order_by_asc(bookings::Column::StartTime)
                .all(&db_tx)
                .await?;
            to_bookings(models)
        })
    }

    pub async fn list_all_bookings(&self, actor: &Actor) -> ResultEngine<Vec<Booking>> {
        actor.require(Action::AdminListing)?;
        with_tx!(self, |db_tx| {
            let models = bookings::Entity::find()
                .order_by_desc(bookings::Column::StartTime)
                .all(&db_tx)
                .await?;
            to_bookings(models)
        })
    }

    /// The actor's advisory priority in a group: ownership share minus share
    /// of the confirmed usage over the last 30 days.
    pub async fn booking_priority(
        &self,
        actor: &Actor,
        group_id: Uuid,
    ) -> ResultEngine<BookingPriority> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, actor).await?;
            let ownership_pct = ownership_shares::Entity::find_by_id((group_id, actor.user_id))
                .one(&db_tx)
                .await?
                .map_or(0.0, |share| share.percentage);

            let usage = self.recent_usage_minutes(&db_tx, group_id).await?;
            let user_usage_minutes = usage.get(&actor.user_id).copied().unwrap_or(0);
            let group_usage_minutes: i64 = usage.values().sum();
            let score = priority(ownership_pct, user_usage_minutes, group_usage_minutes);

            Ok(BookingPriority {
                group_id,
                user_id: actor.user_id,
                ownership_pct,
                user_usage_minutes,
                group_usage_minutes,
                score,
                level: PriorityLevel::from_score(score),
            })
        })
    }

    /// Minutes of confirmed bookings per user that started within the usage
    /// window ending now.
    pub(super) async fn recent_usage_minutes(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<HashMap<Uuid, i64>> {
        let now = self.now();
        let since = now - Duration::days(USAGE_WINDOW_DAYS);
        let models = bookings::Entity::find()
            .filter(bookings::Column::GroupId.eq(group_id))
            .filter(bookings::Column::Status.eq(BookingStatus::Confirmed.as_str()))
            .all(db)
            .await?;

        let mut usage: HashMap<Uuid, i64> = HashMap::new();
        for booking in to_bookings(models)? {
            if booking.start_time >= since && booking.start_time <= now {
                *usage.entry(booking.user_id).or_default() += booking.duration_minutes();
            }
        }
        Ok(usage)
    }
}
