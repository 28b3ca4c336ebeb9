use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Action, Actor, Dispute, DisputeStatus, EngineError, NewDisputeCmd, ResultEngine, disputes,
    util::normalize_required,
};

use super::{Engine, with_tx};

fn to_disputes(models: Vec<disputes::Model>) -> ResultEngine<Vec<Dispute>> {
    models.into_iter().map(Dispute::try_from).collect()
}

impl Engine {
    /// Raises a dispute in a group the actor belongs to.
    ///
    /// A related booking or expense must belong to the same group.
    pub async fn open_dispute(&self, actor: &Actor, cmd: NewDisputeCmd) -> ResultEngine<Dispute> {
        actor.require(Action::OpenDispute)?;
        let title = normalize_required(&cmd.title, "title")?;
        let description = normalize_required(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, cmd.group_id, actor).await?;
            if let Some(booking_id) = cmd.related_booking_id {
                let booking = self.require_booking(&db_tx, booking_id).await?;
                if booking.group_id != group.id {
                    return Err(EngineError::InvalidInput(
                        "booking does not belong to this group".to_string(),
                    ));
                }
            }
            if let Some(expense_id) = cmd.related_expense_id {
                let expense = self.require_expense(&db_tx, expense_id).await?;
                if expense.group_id != group.id {
                    return Err(EngineError::InvalidInput(
                        "expense does not belong to this group".to_string(),
                    ));
                }
            }

            let model = disputes::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group.id),
                created_by: ActiveValue::Set(actor.user_id),
                title: ActiveValue::Set(title),
                description: ActiveValue::Set(description),
                category: ActiveValue::Set(cmd.category.as_str().to_string()),
                status: ActiveValue::Set(DisputeStatus::Open.as_str().to_string()),
                related_booking_id: ActiveValue::Set(cmd.related_booking_id),
                related_expense_id: ActiveValue::Set(cmd.related_expense_id),
                created_at: ActiveValue::Set(self.now()),
                resolved_at: ActiveValue::Set(None),
                resolved_by: ActiveValue::Set(None),
                resolution: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Dispute::try_from(model)
        })
    }

    pub async fn review_dispute(&self, actor: &Actor, dispute_id: Uuid) -> ResultEngine<Dispute> {
        actor.require(Action::ReviewDispute)?;
        self.move_dispute(actor, dispute_id, DisputeStatus::InReview, None)
            .await
    }

    /// Records the staff decision and who made it.
    pub async fn resolve_dispute(
        &self,
        actor: &Actor,
        dispute_id: Uuid,
        resolution: &str,
    ) -> ResultEngine<Dispute> {
        actor.require(Action::ResolveDispute)?;
        let resolution = normalize_required(resolution, "resolution")?;
        self.move_dispute(actor, dispute_id, DisputeStatus::Resolved, Some(resolution))
            .await
    }

    pub async fn close_dispute(&self, actor: &Actor, dispute_id: Uuid) -> ResultEngine<Dispute> {
        actor.require(Action::CloseDispute)?;
        self.move_dispute(actor, dispute_id, DisputeStatus::Closed, None)
            .await
    }

    async fn move_dispute(
        &self,
        actor: &Actor,
        dispute_id: Uuid,
        next: DisputeStatus,
        resolution: Option<String>,
    ) -> ResultEngine<Dispute> {
        with_tx!(self, |db_tx| {
            let model = self.require_dispute(&db_tx, dispute_id).await?;
            let current = DisputeStatus::try_from(model.status.as_str())?;
            if !current.can_transition_to(next) {
                return Err(EngineError::Conflict(format!(
                    "cannot move dispute from {} to {}",
                    current.as_str(),
                    next.as_str()
                )));
            }
            let mut active: disputes::ActiveModel = model.into();
            active.status = ActiveValue::Set(next.as_str().to_string());
            if next == DisputeStatus::Resolved {
                active.resolution = ActiveValue::Set(resolution);
                active.resolved_by = ActiveValue::Set(Some(actor.user_id));
                active.resolved_at = ActiveValue::Set(Some(self.now()));
            }
            Dispute::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn get_dispute(&self, actor: &Actor, dispute_id: Uuid) -> ResultEngine<Dispute> {
        with_tx!(self, |db_tx| {
            let model = self.require_dispute(&db_tx, dispute_id).await?;
            self.require_group_access(&db_tx, model.group_id, actor)
                .await?;
            Dispute::try_from(model)
        })
    }

    /// Every dispute, newest first (staff only).
    pub async fn list_disputes(&self, actor: &Actor) -> ResultEngine<Vec<Dispute>> {
        actor.require(Action::ListAllDisputes)?;
        with_tx!(self, |db_tx| {
            let models = disputes::Entity::find()
                .order_by_desc(disputes::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            to_disputes(models)
        })
    }

    /// Disputes waiting for staff: OPEN or IN_REVIEW, oldest first.
    pub async fn list_open_disputes(&self, actor: &Actor) -> ResultEngine<Vec<Dispute>> {
        actor.require(Action::ListAllDisputes)?;
        with_tx!(self, |db_tx| {
            let models = disputes::Entity::find()
                .filter(disputes::Column::Status.is_in([
                    DisputeStatus::Open.as_str(),
                    DisputeStatus::InReview.as_str(),
                ]))
                .order_by_asc(disputes::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            to_disputes(models)
        })
    }

    pub async fn list_group_disputes(
        &self,
        actor: &Actor,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Dispute>> {
        with_tx!(self, |db_tx| {
            self.require_group_access(&db_tx, group_id, actor).await?;
            let models = disputes::Entity::find()
                .filter(disputes::Column::GroupId.eq(group_id))
                .order_by_desc(disputes::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            to_disputes(models)
        })
    }
}
