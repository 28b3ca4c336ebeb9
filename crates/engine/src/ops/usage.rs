use std::collections::HashMap;

use chrono::Duration;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Action, Actor, BookingStatus, EngineError, ResultEngine, UsageHistory, bookings,
    usage_histories, util::normalize_optional_text,
};

use super::{Engine, bookings::USAGE_WINDOW_DAYS, with_tx};

fn to_histories(models: Vec<usage_histories::Model>) -> Vec<UsageHistory> {
    models.into_iter().map(UsageHistory::from).collect()
}

impl Engine {
    /// Hands the vehicle over for a confirmed booking (staff only).
    ///
    /// Each booking is checked in at most once; the booking times are copied
    /// into the history and a QR token is issued.
    pub async fn check_in(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        start_odometer: i32,
    ) -> ResultEngine<UsageHistory> {
        actor.require(Action::CheckIn)?;
        if start_odometer < 0 {
            return Err(EngineError::InvalidInput(
                "odometer must not be negative".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let booking = self.require_booking(&db_tx, booking_id).await?;
            if booking.status != BookingStatus::Confirmed.as_str() {
                return Err(EngineError::Conflict(
                    "only confirmed bookings can be checked in".to_string(),
                ));
            }
            let existing = usage_histories::Entity::find()
                .filter(usage_histories::Column::BookingId.eq(booking_id))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::Conflict(
                    "booking already checked in".to_string(),
                ));
            }

            let model = usage_histories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                booking_id: ActiveValue::Set(booking.id),
                vehicle_id: ActiveValue::Set(booking.vehicle_id),
                user_id: ActiveValue::Set(booking.user_id),
                start_time: ActiveValue::Set(booking.start_time),
                end_time: ActiveValue::Set(booking.end_time),
                start_odometer: ActiveValue::Set(start_odometer),
                end_odometer: ActiveValue::Set(None),
                distance: ActiveValue::Set(None),
                notes: ActiveValue::Set(None),
                checked_in_by: ActiveValue::Set(actor.user_id),
                checked_in_at: ActiveValue::Set(self.now()),
                checked_out_by: ActiveValue::Set(None),
                checked_out_at: ActiveValue::Set(None),
                check_in_qr: ActiveValue::Set(Uuid::new_v4().to_string()),
                check_out_qr: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Ok(UsageHistory::from(model))
        })
    }

    /// Takes the vehicle back and records the distance driven (staff only).
    pub async fn check_out(
        &self,
        actor: &Actor,
        history_id: Uuid,
        end_odometer: i32,
        notes: Option<&str>,
    ) -> ResultEngine<UsageHistory> {
        actor.require(Action::CheckOut)?;
        let notes = normalize_optional_text(notes);
        with_tx!(self, |db_tx| {
            let model = self.require_history(&db_tx, history_id).await?;
            if model.checked_out_at.is_some() {
                return Err(EngineError::Conflict("already checked out".to_string()));
            }
            if end_odometer < model.start_odometer {
                return Err(EngineError::InvalidInput(format!(
                    "end odometer {end_odometer} is below start odometer {}",
                    model.start_odometer
                )));
            }
            let distance = end_odometer - model.start_odometer;
            let mut active: usage_histories::ActiveModel = model.into();
            active.end_odometer = ActiveValue::Set(Some(end_odometer));
            active.distance = ActiveValue::Set(Some(distance));
            active.notes = ActiveValue::Set(notes);
            active.checked_out_by = ActiveValue::Set(Some(actor.user_id));
            active.checked_out_at = ActiveValue::Set(Some(self.now()));
            active.check_out_qr = ActiveValue::Set(Some(Uuid::new_v4().to_string()));
            Ok(UsageHistory::from(active.update(&db_tx).await?))
        })
    }

    /// A history entry is visible to its driver, group members and staff.
    pub async fn get_history(&self, actor: &Actor, history_id: Uuid) -> ResultEngine<UsageHistory> {
        with_tx!(self, |db_tx| {
            let model = self.require_history(&db_tx, history_id).await?;
            if model.user_id != actor.user_id {
                let vehicle = self.require_vehicle(&db_tx, model.vehicle_id).await?;
                self.require_group_access(&db_tx, vehicle.group_id, actor)
                    .await?;
            }
            Ok(UsageHistory::from(model))
        })
    }

    pub async fn list_my_history(&self, actor: &Actor) -> ResultEngine<Vec<UsageHistory>> {
        self.list_user_history(actor, actor.user_id).await
    }

    /// Usage of one driver, newest first (self or staff).
    pub async fn list_user_history(
        &self,
        actor: &Actor,
        user_id: Uuid,
    ) -> ResultEngine<Vec<UsageHistory>> {
        if actor.user_id != user_id {
            actor.require(Action::ViewAnyUser)?;
        }
        with_tx!(self, |db_tx| {
            let models = usage_histories::Entity::find()
                .filter(usage_histories::Column::UserId.eq(user_id))
                .order_by_desc(usage_histories::Column::StartTime)
                .all(&db_tx)
                .await?;
            Ok(to_histories(models))
        })
    }

    pub async fn list_vehicle_history(
        &self,
        actor: &Actor,
        vehicle_id: Uuid,
    ) -> ResultEngine<Vec<UsageHistory>> {
        with_tx!(self, |db_tx| {
            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            self.require_group_access(&db_tx, vehicle.group_id, actor)
                .await?;
            let models = usage_histories::Entity::find()
                .filter(usage_histories::Column::VehicleId.eq(vehicle_id))
                .order_by_desc(usage_histories::Column::StartTime)
                .all(&db_tx)
                .await?;
            Ok(to_histories(models))
        })
    }

    /// Minutes of recorded usage per user on the group's bookings, counting
    /// histories that started within the usage window.
    pub(super) async fn recorded_usage_minutes(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<HashMap<Uuid, i64>> {
        let now = self.now();
        let since = now - Duration::days(USAGE_WINDOW_DAYS);
        let booking_ids: Vec<Uuid> = bookings::Entity::find()
            .select_only()
            .column(bookings::Column::Id)
            .filter(bookings::Column::GroupId.eq(group_id))
            .into_tuple()
            .all(db)
            .await?;
        if booking_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let histories = usage_histories::Entity::find()
            .filter(usage_histories::Column::BookingId.is_in(booking_ids))
            .filter(usage_histories::Column::StartTime.between(since, now))
            .all(db)
            .await?;

        let mut usage: HashMap<Uuid, i64> = HashMap::new();
        for history in histories {
            let minutes = (history.end_time - history.start_time).num_minutes().max(0);
            *usage.entry(history.user_id).or_default() += minutes;
        }
        Ok(usage)
    }
}
