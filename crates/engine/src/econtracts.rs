//! Electronic co-ownership contracts.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, util::text_enum};

text_enum! {
    pub enum ContractStatus ("contract status") {
        Draft => "DRAFT",
        Signed => "SIGNED",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EContract {
    pub id: Uuid,
    pub group_id: Uuid,
    pub contract_no: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ContractStatus,
    pub terms: Option<String>,
    pub document_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub signed_at: Option<DateTime<Utc>>,
    pub signed_by: Option<Uuid>,
}

impl TryFrom<Model> for EContract {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            contract_no: model.contract_no,
            start_date: model.start_date,
            end_date: model.end_date,
            status: ContractStatus::try_from(model.status.as_str())?,
            terms: model.terms,
            document_url: model.document_url,
            created_by: model.created_by,
            created_at: model.created_at,
            signed_at: model.signed_at,
            signed_by: model.signed_by,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "econtracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    #[sea_orm(unique)]
    pub contract_no: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
    pub terms: Option<String>,
    pub document_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub signed_at: Option<DateTimeUtc>,
    pub signed_by: Option<Uuid>,
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
