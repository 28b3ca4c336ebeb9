//! Group expenses.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, SplitMethod, util::text_enum};

text_enum! {
    pub enum ExpenseType ("expense type") {
        Charging => "CHARGING",
        Maintenance => "MAINTENANCE",
        Insurance => "INSURANCE",
        Inspection => "INSPECTION",
        Cleaning => "CLEANING",
        Other => "OTHER",
    }
}

text_enum! {
    /// PENDING -> APPROVED | REJECTED, APPROVED -> PAID once every share is paid.
    pub enum ExpenseStatus ("expense status") {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Paid => "PAID",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub created_by: Uuid,
    pub expense_type: ExpenseType,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub split_method: SplitMethod,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            vehicle_id: model.vehicle_id,
            created_by: model.created_by,
            expense_type: ExpenseType::try_from(model.expense_type.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            date: model.expense_date,
            description: model.description,
            split_method: SplitMethod::try_from(model.split_method.as_str())?,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub created_by: Uuid,
    pub expense_type: String,
    pub amount_minor: i64,
    pub expense_date: Date,
    pub description: Option<String>,
    pub split_method: String,
    pub status: String,
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
    #[sea_orm(has_many = "super::expense_shares::Entity")]
    ExpenseShares,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::expense_shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseShares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
