//! Payments against expense shares.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::text_enum};

text_enum! {
    pub enum PaymentMethod ("payment method") {
        EWallet => "E_WALLET",
        Banking => "BANKING",
        Cash => "CASH",
    }
}

text_enum! {
    pub enum PaymentStatus ("payment status") {
        Pending => "PENDING",
        Processing => "PROCESSING",
        Completed => "COMPLETED",
        Failed => "FAILED",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub id: Uuid,
    pub expense_share_id: Uuid,
    pub user_id: Uuid,
    pub amount: MoneyCents,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_ref: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            expense_share_id: model.expense_share_id,
            user_id: model.user_id,
            amount: MoneyCents::new(model.amount_minor),
            method: PaymentMethod::try_from(model.method.as_str())?,
            status: PaymentStatus::try_from(model.status.as_str())?,
            transaction_ref: model.transaction_ref,
            notes: model.notes,
            created_at: model.created_at,
            completed_at: model.completed_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_share_id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub method: String,
    pub status: String,
    #[sea_orm(unique)]
    pub transaction_ref: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expense_shares::Entity",
        from = "Column::ExpenseShareId",
        to = "super::expense_shares::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ExpenseShares,
}

impl Related<super::expense_shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseShares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
