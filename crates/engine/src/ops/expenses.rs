use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, Expense, ExpenseShare, ExpenseStatus, NewExpenseCmd,
    ResultEngine, ShareStatus, allocate, expense_shares, expenses,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// An expense together with the shares generated for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseWithShares {
    pub expense: Expense,
    pub shares: Vec<ExpenseShare>,
}

pub(super) fn to_shares(models: Vec<expense_shares::Model>) -> ResultEngine<Vec<ExpenseShare>> {
    models.into_iter().map(ExpenseShare::try_from).collect()
}

fn to_expenses(models: Vec<expenses::Model>) -> ResultEngine<Vec<Expense>> {
    models.into_iter().map(Expense::try_from).collect()
}

impl Engine {
    /// Records an expense and splits it across the group's owners in the same
    /// transaction.
    pub async fn create_expense(
        &self,
        actor: &Actor,
        cmd: NewExpenseCmd,
    ) -> ResultEngine<ExpenseWithShares> {
        actor.require(Action::CreateExpense)?;
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be > 0".to_string(),
            ));
        }
        let description = normalize_optional_text(cmd.description.as_deref());

        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, cmd.group_id, actor).await?;
            if let Some(vehicle_id) = cmd.vehicle_id {
                let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
                if vehicle.group_id != group.id {
                    return Err(EngineError::InvalidInput(
                        "vehicle does not belong to this group".to_string(),
                    ));
                }
            }

            let members: Vec<(Uuid, f64)> = self
                .group_shares(&db_tx, group.id)
                .await?
                .into_iter()
                .map(|share| (share.user_id, share.percentage))
                .collect();
            if members.is_empty() {
                return Err(EngineError::InvalidInput(
                    "group has no co-owners to split the expense".to_string(),
                ));
            }
            let allocations = allocate(cmd.amount, cmd.split_method, &members)?;

            let expense = expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group.id),
                vehicle_id: ActiveValue::Set(cmd.vehicle_id),
                created_by: ActiveValue::Set(actor.user_id),
                expense_type: ActiveValue::Set(cmd.expense_type.as_str().to_string()),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                expense_date: ActiveValue::Set(cmd.date),
                description: ActiveValue::Set(description),
                split_method: ActiveValue::Set(cmd.split_method.as_str().to_string()),
                status: ActiveValue::Set(ExpenseStatus::Pending.as_str().to_string()),
                created_at: ActiveValue::Set(self.now()),
            }
            .insert(&db_tx)
            .await?;

            let mut shares = Vec::with_capacity(allocations.len());
            for allocation in allocations {
                let model = expense_shares::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    expense_id: ActiveValue::Set(expense.id),
                    user_id: ActiveValue::Set(allocation.user_id),
                    amount_minor: ActiveValue::Set(allocation.amount.cents()),
                    paid_minor: ActiveValue::Set(0),
                    status: ActiveValue::Set(ShareStatus::Pending.as_str().to_string()),
                }
                .insert(&db_tx)
                .await?;
                shares.push(ExpenseShare::try_from(model)?);
            }

            Ok(ExpenseWithShares {
                expense: Expense::try_from(expense)?,
                shares,
            })
        })
    }

    pub async fn approve_expense(&self, actor: &Actor, expense_id: Uuid) -> ResultEngine<Expense> {
        self.decide_expense(actor, expense_id, ExpenseStatus::Approved)
            .await
    }

    pub async fn reject_expense(&self, actor: &Actor, expense_id: Uuid) -> ResultEngine<Expense> {
        self.decide_expense(actor, expense_id, ExpenseStatus::Rejected)
            .await
    }

    /// Approval and rejection are decided by group members only, from PENDING.
    async fn decide_expense(
        &self,
        actor: &Actor,
        expense_id: Uuid,
        decision: ExpenseStatus,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, expense_id).await?;
            self.require_group_member(&db_tx, model.group_id, actor)
                .await?;
            if model.status != ExpenseStatus::Pending.as_str() {
                return Err(EngineError::Conflict(format!(
                    "expense is {}, only pending expenses can be decided",
                    model.status
                )));
            }
            let mut active: expenses::ActiveModel = model.into();
            active.status = ActiveValue::Set(decision.as_str().to_string());
            let model = active.update(&db_tx).await?;
            // Shares may all have been paid before the approval.
            let model = self.promote_if_settled(&db_tx, model).await?;
            Expense::try_from(model)
        })
    }

    /// Deletes an expense and its shares (creator only, nothing paid yet).
    pub async fn delete_expense(&self, actor: &Actor, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, expense_id).await?;
            if model.created_by != actor.user_id {
                return Err(EngineError::Forbidden(
                    "only the creator can delete an expense".to_string(),
                ));
            }
            let shares = expense_shares::Entity::find()
                .filter(expense_shares::Column::ExpenseId.eq(expense_id))
                .all(&db_tx)
                .await?;
            if shares.iter().any(|share| share.paid_minor > 0) {
                return Err(EngineError::Conflict(
                    "expense already has payments".to_string(),
                ));
            }

            expense_shares::Entity::delete_many()
                .filter(expense_shares::Column::ExpenseId.eq(expense_id))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn get_expense(&self, actor: &Actor, expense_id: Uuid) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, expense_id).await?;
            self.require_group_access(&db_tx, model.group_id, actor)
                .await?;
            Expense::try_from(model)
        })
    }

    /// Expenses of a group, most recent date first.
    pub async fn list_group_expenses(
        &self,
        actor: &Actor,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_group_access(&db_tx, group_id, actor).await?;
            let models = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group_id))
                .order_by_desc(expenses::Column::ExpenseDate)
                .order_by_desc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            to_expenses(models)
        })
    }

    pub async fn list_expense_shares(
        &self,
        actor: &Actor,
        expense_id: Uuid,
    ) -> ResultEngine<Vec<ExpenseShare>> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id).await?;
            self.require_group_access(&db_tx, expense.group_id, actor)
                .await?;
            let models = expense_shares::Entity::find()
                .filter(expense_shares::Column::ExpenseId.eq(expense_id))
                .all(&db_tx)
                .await?;
            to_shares(models)
        })
    }

    pub async fn list_my_shares(&self, actor: &Actor) -> ResultEngine<Vec<ExpenseShare>> {
        with_tx!(self, |db_tx| {
            let models = expense_shares::Entity::find()
                .filter(expense_shares::Column::UserId.eq(actor.user_id))
                .all(&db_tx)
                .await?;
            to_shares(models)
        })
    }

    pub async fn list_all_expenses(&self, actor: &Actor) -> ResultEngine<Vec<Expense>> {
        actor.require(Action::AdminListing)?;
        with_tx!(self, |db_tx| {
            let models = expenses::Entity::find()
                .order_by_desc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            to_expenses(models)
        })
    }

    /// Moves an APPROVED expense to PAID once every share is paid.
    pub(super) async fn promote_if_settled(
        &self,
        db: &DatabaseTransaction,
        expense: expenses::Model,
    ) -> ResultEngine<expenses::Model> {
        if expense.status != ExpenseStatus::Approved.as_str() {
            return Ok(expense);
        }
        let shares = expense_shares::Entity::find()
            .filter(expense_shares::Column::ExpenseId.eq(expense.id))
            .all(db)
            .await?;
        let settled = shares
            .iter()
            .all(|share| share.status == ShareStatus::Paid.as_str());
        if !settled {
            return Ok(expense);
        }
        let mut active: expenses::ActiveModel = expense.into();
        active.status = ActiveValue::Set(ExpenseStatus::Paid.as_str().to_string());
        Ok(active.update(db).await?)
    }
}
