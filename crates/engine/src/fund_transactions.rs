//! Fund ledger rows.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::text_enum};

text_enum! {
    pub enum FundTransactionKind ("fund transaction kind") {
        Deposit => "DEPOSIT",
        Withdraw => "WITHDRAW",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundTransaction {
    pub id: Uuid,
    pub fund_id: Uuid,
    pub kind: FundTransactionKind,
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl TryFrom<Model> for FundTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            fund_id: model.fund_id,
            kind: FundTransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            occurred_at: model.occurred_at,
            created_by: model.created_by,
            description: model.description,
            reference: model.reference,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fund_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub fund_id: Uuid,
    pub kind: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub created_by: Uuid,
    pub description: Option<String>,
    pub reference: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::common_funds::Entity",
        from = "Column::FundId",
        to = "super::common_funds::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CommonFunds,
}

impl Related<super::common_funds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommonFunds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
