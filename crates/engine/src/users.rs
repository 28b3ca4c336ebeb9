//! Users and their stored credentials.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{Actor, RoleSet};

/// A registered user with the roles attached to the account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn from_model(model: Model, roles: RoleSet) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            roles,
            created_at: model.created_at,
        }
    }

    /// Request context for operations performed by this user.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.roles.clone())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_roles::Entity")]
    UserRoles,
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
