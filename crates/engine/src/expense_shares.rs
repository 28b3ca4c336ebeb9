//! A member's owed portion of one expense.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::text_enum};

text_enum! {
    pub enum ShareStatus ("share status") {
        Pending => "PENDING",
        Partial => "PARTIAL",
        Paid => "PAID",
    }
}

impl ShareStatus {
    /// Status after `paid` has been collected against `owed`.
    pub fn for_paid(paid: MoneyCents, owed: MoneyCents) -> Self {
        if paid >= owed {
            Self::Paid
        } else if paid.is_positive() {
            Self::Partial
        } else {
            Self::Pending
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseShare {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub amount: MoneyCents,
    pub paid: MoneyCents,
    pub status: ShareStatus,
}

impl ExpenseShare {
    pub fn remaining(&self) -> MoneyCents {
        self.amount - self.paid
    }
}

impl TryFrom<Model> for ExpenseShare {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            expense_id: model.expense_id,
            user_id: model.user_id,
            amount: MoneyCents::new(model.amount_minor),
            paid: MoneyCents::new(model.paid_minor),
            status: ShareStatus::try_from(model.status.as_str())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub paid_minor: i64,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
