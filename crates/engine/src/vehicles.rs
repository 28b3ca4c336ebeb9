//! Vehicles owned by a group.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    pub id: Uuid,
    pub group_id: Uuid,
    pub vin: String,
    pub plate: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Vehicle {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            vin: model.vin,
            plate: model.plate,
            model: model.model_name,
            created_at: model.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    #[sea_orm(unique)]
    pub vin: String,
    #[sea_orm(unique)]
    pub plate: String,
    pub model_name: String,
    pub created_at: DateTimeUtc,
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
