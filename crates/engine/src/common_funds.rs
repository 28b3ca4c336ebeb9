//! Group funds and their balance.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::text_enum};

text_enum! {
    pub enum FundType ("fund type") {
        MaintenanceReserve => "MAINTENANCE_RESERVE",
        Emergency => "EMERGENCY",
        Other => "OTHER",
    }
}

/// A group-level monetary pool. The balance only moves through ledger rows
/// (see [`super::fund_transactions`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommonFund {
    pub id: Uuid,
    pub group_id: Uuid,
    pub fund_type: FundType,
    pub balance: MoneyCents,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for CommonFund {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            fund_type: FundType::try_from(model.fund_type.as_str())?,
            balance: MoneyCents::new(model.balance_minor),
            description: model.description,
            created_at: model.created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "common_funds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub fund_type: String,
    pub balance_minor: i64,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Groups,
    #[sea_orm(has_many = "super::fund_transactions::Entity")]
    FundTransactions,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::fund_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
