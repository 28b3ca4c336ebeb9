use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, MoneyCents, PayShareCmd, Payment, PaymentStatus, ResultEngine,
    ShareStatus, expense_shares, payments, util::normalize_optional_text,
};

use super::{Engine, with_tx};

fn to_payments(models: Vec<payments::Model>) -> ResultEngine<Vec<Payment>> {
    models.into_iter().map(Payment::try_from).collect()
}

impl Engine {
    /// Pays (part of) one of the actor's expense shares.
    ///
    /// The payment is recorded as completed, the share's paid amount and
    /// status are updated and the expense is settled when this was the last
    /// open share of an approved expense.
    pub async fn pay_share(&self, actor: &Actor, cmd: PayShareCmd) -> ResultEngine<Payment> {
        actor.require(Action::PayShare)?;
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        let notes = normalize_optional_text(cmd.notes.as_deref());

        with_tx!(self, |db_tx| {
            let share = self.require_share(&db_tx, cmd.expense_share_id).await?;
            if share.user_id != actor.user_id {
                return Err(EngineError::Forbidden(
                    "only the share owner can pay it".to_string(),
                ));
            }
            let owed = MoneyCents::new(share.amount_minor);
            let paid = MoneyCents::new(share.paid_minor);
            let remaining = owed - paid;
            if cmd.amount > remaining {
                return Err(EngineError::InvalidAmount(format!(
                    "payment exceeds the remaining {remaining}"
                )));
            }

            let now = self.now();
            let payment = payments::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                expense_share_id: ActiveValue::Set(share.id),
                user_id: ActiveValue::Set(actor.user_id),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                method: ActiveValue::Set(cmd.method.as_str().to_string()),
                status: ActiveValue::Set(PaymentStatus::Completed.as_str().to_string()),
                transaction_ref: ActiveValue::Set(Uuid::new_v4().to_string()),
                notes: ActiveValue::Set(notes),
                created_at: ActiveValue::Set(now),
                completed_at: ActiveValue::Set(Some(now)),
            }
            .insert(&db_tx)
            .await?;

            let paid = paid + cmd.amount;
            let expense_id = share.expense_id;
            let mut active: expense_shares::ActiveModel = share.into();
            active.paid_minor = ActiveValue::Set(paid.cents());
            active.status = ActiveValue::Set(ShareStatus::for_paid(paid, owed).as_str().to_string());
            active.update(&db_tx).await?;

            let expense = self.require_expense(&db_tx, expense_id).await?;
            self.promote_if_settled(&db_tx, expense).await?;

            Payment::try_from(payment)
        })
    }

    /// Overrides a payment's status (staff only).
    pub async fn update_payment_status(
        &self,
        actor: &Actor,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> ResultEngine<Payment> {
        actor.require(Action::UpdatePaymentStatus)?;
        with_tx!(self, |db_tx| {
            let model = self.require_payment(&db_tx, payment_id).await?;
            let completed_at = match status {
                PaymentStatus::Completed => Some(model.completed_at.unwrap_or_else(|| self.now())),
                _ => model.completed_at,
            };
            let mut active: payments::ActiveModel = model.into();
            active.status = ActiveValue::Set(status.as_str().to_string());
            active.completed_at = ActiveValue::Set(completed_at);
            Payment::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn get_payment(&self, actor: &Actor, payment_id: Uuid) -> ResultEngine<Payment> {
        with_tx!(self, |db_tx| {
            let model = self.require_payment(&db_tx, payment_id).await?;
            if model.user_id != actor.user_id {
                actor.require(Action::UpdatePaymentStatus)?;
            }
            Payment::try_from(model)
        })
    }

    /// Payments made against one expense share, newest first. Readable by the
    /// share owner, members of the expense's group and staff.
    pub async fn list_share_payments(
        &self,
        actor: &Actor,
        share_id: Uuid,
    ) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            let share = self.require_share(&db_tx, share_id).await?;
            if share.user_id != actor.user_id {
                let expense = self.require_expense(&db_tx, share.expense_id).await?;
                self.require_group_access(&db_tx, expense.group_id, actor)
                    .await?;
            }
            let models = payments::Entity::find()
                .filter(payments::Column::ExpenseShareId.eq(share_id))
                .order_by_desc(payments::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            to_payments(models)
        })
    }

    /// The actor's payments, newest first.
    pub async fn list_my_payments(&self, actor: &Actor) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            let models = payments::Entity::find()
                .filter(payments::Column::UserId.eq(actor.user_id))
                .order_by_desc(payments::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            to_payments(models)
        })
    }

    pub async fn list_all_payments(&self, actor: &Actor) -> ResultEngine<Vec<Payment>> {
        actor.require(Action::AdminListing)?;
        with_tx!(self, |db_tx| {
            let models = payments::Entity::find()
                .order_by_desc(payments::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            to_payments(models)
        })
    }
}
