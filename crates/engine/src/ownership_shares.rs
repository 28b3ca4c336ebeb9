//! Ownership shares: a user's fractional claim on a group.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// Tolerance applied when checking that a group's shares stay within 100%.
pub const OWNERSHIP_EPSILON: f64 = 1e-9;

/// A member of a group with their ownership percentage (`0..=1`).
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub percentage: f64,
    pub joined_at: DateTime<Utc>,
}

impl From<Model> for Member {
    fn from(model: Model) -> Self {
        Self {
            group_id: model.group_id,
            user_id: model.user_id,
            percentage: model.percentage,
            joined_at: model.joined_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ownership_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub percentage: f64,
    pub joined_at: DateTimeUtc,
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
