//! Group decisions.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, VoteStatus, VotingMethod};

/// One selectable answer of a vote and how many ballots chose it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteChoice {
    pub label: String,
    pub count: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    pub id: Uuid,
    pub group_id: Uuid,
    pub topic: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    /// Read-side status: OPEN votes past their deadline are reported CLOSED.
    pub status: VoteStatus,
    pub voting_method: VotingMethod,
    pub result: Option<String>,
    pub options: Vec<VoteChoice>,
}

impl Vote {
    pub(crate) fn from_model(
        model: Model,
        options: Vec<super::vote_options::Model>,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let stored = VoteStatus::try_from(model.status.as_str())?;
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            topic: model.topic,
            description: model.description,
            created_by: model.created_by,
            created_at: model.created_at,
            deadline: model.deadline,
            status: stored.effective(model.deadline, now),
            voting_method: VotingMethod::try_from(model.voting_method.as_str())?,
            result: model.result,
            options: options
                .into_iter()
                .map(|o| VoteChoice {
                    label: o.label,
                    count: o.count,
                })
                .collect(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub topic: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub deadline: DateTimeUtc,
    pub status: String,
    pub voting_method: String,
    pub result: Option<String>,
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
    #[sea_orm(has_many = "super::vote_options::Entity")]
    VoteOptions,
    #[sea_orm(has_many = "super::user_votes::Entity")]
    UserVotes,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::vote_options::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteOptions.def()
    }
}

impl Related<super::user_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserVotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
