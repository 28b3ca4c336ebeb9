//! Disputes raised by group members and handled by staff.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, util::text_enum};

text_enum! {
    pub enum DisputeCategory ("dispute category") {
        Expense => "EXPENSE",
        Booking => "BOOKING",
        Ownership => "OWNERSHIP",
        Payment => "PAYMENT",
        Other => "OTHER",
    }
}

text_enum! {
    pub enum DisputeStatus ("dispute status") {
        Open => "OPEN",
        InReview => "IN_REVIEW",
        Resolved => "RESOLVED",
        Closed => "CLOSED",
    }
}

impl DisputeStatus {
    /// OPEN -> IN_REVIEW -> RESOLVED -> CLOSED; an OPEN dispute may be resolved directly.
    pub fn can_transition_to(self, next: DisputeStatus) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::InReview)
                | (Self::Open, Self::Resolved)
                | (Self::InReview, Self::Resolved)
                | (Self::Resolved, Self::Closed)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispute {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    pub category: DisputeCategory,
    pub status: DisputeStatus,
    pub related_booking_id: Option<Uuid>,
    pub related_expense_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
    pub resolution: Option<String>,
}

impl TryFrom<Model> for Dispute {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            created_by: model.created_by,
            title: model.title,
            description: model.description,
            category: DisputeCategory::try_from(model.category.as_str())?,
            status: DisputeStatus::try_from(model.status.as_str())?,
            related_booking_id: model.related_booking_id,
            related_expense_id: model.related_expense_id,
            created_at: model.created_at,
            resolved_at: model.resolved_at,
            resolved_by: model.resolved_by,
            resolution: model.resolution,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "disputes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub related_booking_id: Option<Uuid>,
    pub related_expense_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
    pub resolved_by: Option<Uuid>,
    pub resolution: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispute_lifecycle() {
        use DisputeStatus::*;
        assert!(Open.can_transition_to(InReview));
        assert!(Open.can_transition_to(Resolved));
        assert!(InReview.can_transition_to(Resolved));
        assert!(Resolved.can_transition_to(Closed));
        assert!(!Open.can_transition_to(Closed));
        assert!(!Closed.can_transition_to(Open));
    }
}
