//! Recorded vehicle usage: staff check-in and check-out per booking.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageHistory {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_odometer: i32,
    pub end_odometer: Option<i32>,
    /// Kilometres driven, known after check-out.
    pub distance: Option<i32>,
    pub notes: Option<String>,
    pub checked_in_by: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_by: Option<Uuid>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub check_in_qr: String,
    pub check_out_qr: Option<String>,
}

impl UsageHistory {
    pub fn is_checked_out(&self) -> bool {
        self.checked_out_at.is_some()
    }
}

impl From<Model> for UsageHistory {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            booking_id: model.booking_id,
            vehicle_id: model.vehicle_id,
            user_id: model.user_id,
            start_time: model.start_time,
            end_time: model.end_time,
            start_odometer: model.start_odometer,
            end_odometer: model.end_odometer,
            distance: model.distance,
            notes: model.notes,
            checked_in_by: model.checked_in_by,
            checked_in_at: model.checked_in_at,
            checked_out_by: model.checked_out_by,
            checked_out_at: model.checked_out_at,
            check_in_qr: model.check_in_qr,
            check_out_qr: model.check_out_qr,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "usage_histories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub booking_id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub start_odometer: i32,
    pub end_odometer: Option<i32>,
    pub distance: Option<i32>,
    pub notes: Option<String>,
    pub checked_in_by: Uuid,
    pub checked_in_at: DateTimeUtc,
    pub checked_out_by: Option<Uuid>,
    pub checked_out_at: Option<DateTimeUtc>,
    pub check_in_qr: String,
    pub check_out_qr: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
