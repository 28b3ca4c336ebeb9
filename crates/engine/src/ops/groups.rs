use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Action, Actor, BookingStatus, EngineError, Group, Member, OWNERSHIP_EPSILON, ResultEngine,
    bookings, common_funds, disputes, econtracts, expenses, groups, ownership_shares, vehicles,
    votes,
    util::{normalize_key, normalize_required, validate_percentage},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a group owned by the actor. Names are unique ignoring case,
    /// accents and spacing.
    pub async fn create_group(&self, actor: &Actor, name: &str) -> ResultEngine<Group> {
        actor.require(Action::CreateGroup)?;
        let name = normalize_required(name, "group name")?;
        let name_norm = normalize_key(&name)
            .ok_or_else(|| EngineError::InvalidInput("group name must not be empty".to_string()))?;

        with_tx!(self, |db_tx| {
            let clash = groups::Entity::find()
                .filter(groups::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let model = groups::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                created_by: ActiveValue::Set(actor.user_id),
                created_at: ActiveValue::Set(self.now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(Group::from(model))
        })
    }

    /// Groups the actor belongs to. Admins see every group.
    pub async fn list_groups(&self, actor: &Actor) -> ResultEngine<Vec<Group>> {
        with_tx!(self, |db_tx| {
            let mut query = groups::Entity::find().order_by_asc(groups::Column::CreatedAt);
            if !actor.can(Action::AdminListing) {
                let member_of: Vec<Uuid> = ownership_shares::Entity::find()
                    .filter(ownership_shares::Column::UserId.eq(actor.user_id))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|share| share.group_id)
                    .collect();
                query = query.filter(
                    Condition::any()
                        .add(groups::Column::CreatedBy.eq(actor.user_id))
                        .add(groups::Column::Id.is_in(member_of)),
                );
            }
            let models = query.all(&db_tx).await?;
            Ok(models.into_iter().map(Group::from).collect())
        })
    }

    pub async fn get_group(&self, actor: &Actor, group_id: Uuid) -> ResultEngine<Group> {
        with_tx!(self, |db_tx| {
            let group = self.require_group_access(&db_tx, group_id, actor).await?;
            Ok(Group::from(group))
        })
    }

    pub async fn list_members(&self, actor: &Actor, group_id: Uuid) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            self.require_group_access(&db_tx, group_id, actor).await?;
            let shares = self.group_shares(&db_tx, group_id).await?;
            Ok(shares.into_iter().map(Member::from).collect())
        })
    }

    /// Adds a co-owner with `percentage` of the group (owner only).
    ///
    /// Rejected when the group's total ownership would exceed 100%.
    pub async fn add_member(
        &self,
        actor: &Actor,
        group_id: Uuid,
        user_id: Uuid,
        percentage: f64,
    ) -> ResultEngine<Member> {
        validate_percentage(percentage)?;
        with_tx!(self, |db_tx| {
            self.require_group_owner(&db_tx, group_id, actor).await?;
            self.require_user(&db_tx, user_id).await?;

            let existing = ownership_shares::Entity::find_by_id((group_id, user_id))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "user {user_id} is already a member"
                )));
            }

            self.ensure_ownership_room(&db_tx, group_id, None, percentage)
                .await?;

            let model = ownership_shares::ActiveModel {
                group_id: ActiveValue::Set(group_id),
                user_id: ActiveValue::Set(user_id),
                percentage: ActiveValue::Set(percentage),
                joined_at: ActiveValue::Set(self.now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(Member::from(model))
        })
    }

    /// Changes a member's percentage (owner only), under the same 100% cap.
    pub async fn update_member_share(
        &self,
        actor: &Actor,
        group_id: Uuid,
        user_id: Uuid,
        percentage: f64,
    ) -> ResultEngine<Member> {
        validate_percentage(percentage)?;
        with_tx!(self, |db_tx| {
            self.require_group_owner(&db_tx, group_id, actor).await?;
            let share = ownership_shares::Entity::find_by_id((group_id, user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            self.ensure_ownership_room(&db_tx, group_id, Some(user_id), percentage)
                .await?;

            let mut active: ownership_shares::ActiveModel = share.into();
            active.percentage = ActiveValue::Set(percentage);
            let model = active.update(&db_tx).await?;
            Ok(Member::from(model))
        })
    }

    /// Removes a member (owner only). Members with pending or confirmed
    /// bookings in the group cannot be removed.
    pub async fn remove_member(
        &self,
        actor: &Actor,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_group_owner(&db_tx, group_id, actor).await?;
            ownership_shares::Entity::find_by_id((group_id, user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            let active_bookings = bookings::Entity::find()
                .filter(bookings::Column::GroupId.eq(group_id))
                .filter(bookings::Column::UserId.eq(user_id))
                .filter(bookings::Column::Status.is_in([
                    BookingStatus::Pending.as_str(),
                    BookingStatus::Confirmed.as_str(),
                ]))
                .count(&db_tx)
                .await?;
            if active_bookings > 0 {
                return Err(EngineError::Conflict(
                    "member has active bookings".to_string(),
                ));
            }

            ownership_shares::Entity::delete_by_id((group_id, user_id))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Hands the group over to another member (owner only).
    pub async fn transfer_ownership(
        &self,
        actor: &Actor,
        group_id: Uuid,
        new_owner: Uuid,
    ) -> ResultEngine<Group> {
        with_tx!(self, |db_tx| {
            let group = self.require_group_owner(&db_tx, group_id, actor).await?;
            if !self.is_group_member(&db_tx, &group, new_owner).await? {
                return Err(EngineError::Conflict(
                    "new owner must be a member of the group".to_string(),
                ));
            }
            let mut active: groups::ActiveModel = group.into();
            active.created_by = ActiveValue::Set(new_owner);
            let model = active.update(&db_tx).await?;
            Ok(Group::from(model))
        })
    }

    /// Deletes an empty group (owner or admin).
    pub async fn delete_group(&self, actor: &Actor, group_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            if group.created_by != actor.user_id {
                actor.require(Action::DeleteAnyGroup)?;
            }

            let in_use = [
                (
                    "vehicles",
                    vehicles::Entity::find()
                        .filter(vehicles::Column::GroupId.eq(group_id))
                        .count(&db_tx)
                        .await?,
                ),
                (
                    "expenses",
                    expenses::Entity::find()
                        .filter(expenses::Column::GroupId.eq(group_id))
                        .count(&db_tx)
                        .await?,
                ),
                (
                    "bookings",
                    bookings::Entity::find()
                        .filter(bookings::Column::GroupId.eq(group_id))
                        .count(&db_tx)
                        .await?,
                ),
                (
                    "votes",
                    votes::Entity::find()
                        .filter(votes::Column::GroupId.eq(group_id))
                        .count(&db_tx)
                        .await?,
                ),
                (
                    "funds",
                    common_funds::Entity::find()
                        .filter(common_funds::Column::GroupId.eq(group_id))
                        .count(&db_tx)
                        .await?,
                ),
                (
                    "disputes",
                    disputes::Entity::find()
                        .filter(disputes::Column::GroupId.eq(group_id))
                        .count(&db_tx)
                        .await?,
                ),
                (
                    "contracts",
                    econtracts::Entity::find()
                        .filter(econtracts::Column::GroupId.eq(group_id))
                        .count(&db_tx)
                        .await?,
                ),
            ];
            if let Some((what, _)) = in_use.iter().find(|(_, count)| *count > 0) {
                return Err(EngineError::Conflict(format!(
                    "group still has {what}"
                )));
            }

            ownership_shares::Entity::delete_many()
                .filter(ownership_shares::Column::GroupId.eq(group_id))
                .exec(&db_tx)
                .await?;
            groups::Entity::delete_by_id(group_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Fails with `Conflict` when adding `percentage` (replacing `replacing`'s
    /// current share, if any) pushes the group above 100%.
    async fn ensure_ownership_room(
        &self,
        db: &sea_orm::DatabaseTransaction,
        group_id: Uuid,
        replacing: Option<Uuid>,
        percentage: f64,
    ) -> ResultEngine<()> {
        let current: f64 = self
            .group_shares(db, group_id)
            .await?
            .iter()
            .filter(|share| Some(share.user_id) != replacing)
            .map(|share| share.percentage)
            .sum();
        if current + percentage > 1.0 + OWNERSHIP_EPSILON {
            return Err(EngineError::Conflict(format!(
                "total ownership would exceed 100% (currently {:.2}%)",
                current * 100.0
            )));
        }
        Ok(())
    }
}
