use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, ResultEngine, Role, RoleSet, bookings, common_funds, disputes,
    econtracts, expense_shares, expenses, groups, ownership_shares, payments, usage_histories,
    user_roles, users, vehicles, votes,
};

use super::Engine;

/// Generates a `require_*` lookup returning the model or `KeyNotFound`.
macro_rules! impl_require_by_id {
    ($require_fn:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_by_id!(require_user, users, "user not exists");
    impl_require_by_id!(require_group, groups, "group not exists");
    impl_require_by_id!(require_vehicle, vehicles, "vehicle not exists");
    impl_require_by_id!(require_booking, bookings, "booking not exists");
    impl_require_by_id!(require_expense, expenses, "expense not exists");
    impl_require_by_id!(require_share, expense_shares, "expense share not exists");
    impl_require_by_id!(require_payment, payments, "payment not exists");
    impl_require_by_id!(require_fund, common_funds, "fund not exists");
    impl_require_by_id!(require_vote, votes, "vote not exists");
    impl_require_by_id!(require_dispute, disputes, "dispute not exists");
    impl_require_by_id!(require_contract, econtracts, "contract not exists");
    impl_require_by_id!(require_history, usage_histories, "usage history not exists");

    pub(super) async fn load_roles(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<RoleSet> {
        let rows = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(db)
            .await?;
        rows.iter()
            .map(|row| Role::try_from(row.role.as_str()))
            .collect()
    }

    /// A user is a member of a group when holding an ownership share in it or
    /// having created it.
    pub(super) async fn is_group_member(
        &self,
        db: &DatabaseTransaction,
        group: &groups::Model,
        user_id: Uuid,
    ) -> ResultEngine<bool> {
        if group.created_by == user_id {
            return Ok(true);
        }
        let share = ownership_shares::Entity::find_by_id((group.id, user_id))
            .one(db)
            .await?;
        Ok(share.is_some())
    }

    /// Group lookup for operations reserved to members.
    pub(super) async fn require_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        actor: &Actor,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_group(db, group_id).await?;
        if !self.is_group_member(db, &group, actor.user_id).await? {
            return Err(EngineError::Forbidden(
                "not a member of this group".to_string(),
            ));
        }
        Ok(group)
    }

    /// Group lookup for read access: members, or staff acting on any group.
    pub(super) async fn require_group_access(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        actor: &Actor,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_group(db, group_id).await?;
        if actor.can(Action::ViewAnyGroup) || self.is_group_member(db, &group, actor.user_id).await?
        {
            return Ok(group);
        }
        Err(EngineError::Forbidden(
            "not a member of this group".to_string(),
        ))
    }

    pub(super) async fn require_group_owner(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        actor: &Actor,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_group(db, group_id).await?;
        if group.created_by != actor.user_id {
            return Err(EngineError::Forbidden(
                "only the group owner can do this".to_string(),
            ));
        }
        Ok(group)
    }

    /// Ownership shares of a group, oldest member first.
    pub(super) async fn group_shares(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<ownership_shares::Model>> {
        let mut rows = ownership_shares::Entity::find()
            .filter(ownership_shares::Column::GroupId.eq(group_id))
            .all(db)
            .await?;
        rows.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(rows)
    }
}
