use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, ExpenseStatus, ExpenseType, MoneyCents, ResultEngine, ShareStatus,
    expense_shares, expenses,
};

use super::{Engine, with_tx};

/// Members whose usage share differs from their ownership share by less than
/// this many percentage points are considered fair.
const FAIRNESS_THRESHOLD_POINTS: f64 = 10.0;

/// Expense totals of a group over a date range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinancialReport {
    pub group_id: Uuid,
    pub group_name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total: MoneyCents,
    /// Only types with at least one expense, in declaration order.
    pub by_type: Vec<(ExpenseType, MoneyCents)>,
    pub expense_count: usize,
    pub paid_count: usize,
    pub pending_count: usize,
}

/// What a user owes and has paid across all their expense shares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserExpenseReport {
    pub user_id: Uuid,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub total_owed: MoneyCents,
    pub total_paid: MoneyCents,
    pub total_pending: MoneyCents,
    pub share_count: usize,
    pub paid_count: usize,
    pub pending_count: usize,
}

/// One member's ownership against recent usage, both in percent.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberUsage {
    pub user_id: Uuid,
    pub usage_minutes: i64,
    pub ownership_pct: f64,
    pub usage_pct: f64,
    /// Ownership minus usage, in percentage points.
    pub difference: f64,
    pub is_fair: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UsageReport {
    pub group_id: Uuid,
    pub group_name: String,
    pub group_usage_minutes: i64,
    pub members: Vec<MemberUsage>,
}

const EXPENSE_TYPES: [ExpenseType; 6] = [
    ExpenseType::Charging,
    ExpenseType::Maintenance,
    ExpenseType::Insurance,
    ExpenseType::Inspection,
    ExpenseType::Cleaning,
    ExpenseType::Other,
];

impl Engine {
    /// Totals of the group's expenses dated within `[from, to]`.
    pub async fn group_financial_report(
        &self,
        actor: &Actor,
        group_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<FinancialReport> {
        if to < from {
            return Err(EngineError::InvalidRange(
                "report end date is before its start date".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let group = self.require_group_access(&db_tx, group_id, actor).await?;
            let models = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group_id))
                .filter(expenses::Column::ExpenseDate.between(from, to))
                .all(&db_tx)
                .await?;

            let mut total = MoneyCents::ZERO;
            let mut per_type = [MoneyCents::ZERO; EXPENSE_TYPES.len()];
            let mut seen = [false; EXPENSE_TYPES.len()];
            let mut paid_count = 0;
            let mut pending_count = 0;
            for model in &models {
                let amount = MoneyCents::new(model.amount_minor);
                total += amount;
                let kind = ExpenseType::try_from(model.expense_type.as_str())?;
                if let Some(idx) = EXPENSE_TYPES.iter().position(|t| *t == kind) {
                    per_type[idx] += amount;
                    seen[idx] = true;
                }
                match ExpenseStatus::try_from(model.status.as_str())? {
                    ExpenseStatus::Paid => paid_count += 1,
                    ExpenseStatus::Pending => pending_count += 1,
                    ExpenseStatus::Approved | ExpenseStatus::Rejected => {}
                }
            }

            let by_type = EXPENSE_TYPES
                .iter()
                .zip(per_type)
                .zip(seen)
                .filter(|(_, seen)| *seen)
                .map(|((kind, amount), _)| (*kind, amount))
                .collect();

            Ok(FinancialReport {
                group_id,
                group_name: group.name,
                from,
                to,
                total,
                by_type,
                expense_count: models.len(),
                paid_count,
                pending_count,
            })
        })
    }

    /// Owed and paid totals of a user (self or staff), optionally limited to
    /// expenses dated within `[from, to]`.
    pub async fn user_expense_report(
        &self,
        actor: &Actor,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ResultEngine<UserExpenseReport> {
        if actor.user_id != user_id {
            actor.require(Action::ViewAnyUser)?;
        }
        if matches!((from, to), (Some(from), Some(to)) if to < from) {
            return Err(EngineError::InvalidRange(
                "report end date is before its start date".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let shares = expense_shares::Entity::find()
                .filter(expense_shares::Column::UserId.eq(user_id))
                .all(&db_tx)
                .await?;

            let shares = if from.is_some() || to.is_some() {
                let expense_ids: Vec<Uuid> = shares.iter().map(|s| s.expense_id).collect();
                let mut query =
                    expenses::Entity::find().filter(expenses::Column::Id.is_in(expense_ids));
                if let Some(from) = from {
                    query = query.filter(expenses::Column::ExpenseDate.gte(from));
                }
                if let Some(to) = to {
                    query = query.filter(expenses::Column::ExpenseDate.lte(to));
                }
                let in_range: HashSet<Uuid> =
                    query.all(&db_tx).await?.into_iter().map(|e| e.id).collect();
                shares
                    .into_iter()
                    .filter(|s| in_range.contains(&s.expense_id))
                    .collect()
            } else {
                shares
            };

            let mut total_owed = MoneyCents::ZERO;
            let mut total_paid = MoneyCents::ZERO;
            let mut paid_count = 0;
            let mut pending_count = 0;
            for share in &shares {
                total_owed += MoneyCents::new(share.amount_minor);
                total_paid += MoneyCents::new(share.paid_minor);
                match ShareStatus::try_from(share.status.as_str())? {
                    ShareStatus::Paid => paid_count += 1,
                    ShareStatus::Pending => pending_count += 1,
                    ShareStatus::Partial => {}
                }
            }

            Ok(UserExpenseReport {
                user_id,
                from,
                to,
                total_owed,
                total_paid,
                total_pending: total_owed - total_paid,
                share_count: shares.len(),
                paid_count,
                pending_count,
            })
        })
    }

    /// Compares each co-owner's ownership with their share of the recorded
    /// usage (check-in histories) over the last 30 days.
    pub async fn usage_vs_ownership(
        &self,
        actor: &Actor,
        group_id: Uuid,
    ) -> ResultEngine<UsageReport> {
        with_tx!(self, |db_tx| {
            let group = self.require_group_access(&db_tx, group_id, actor).await?;
            let shares = self.group_shares(&db_tx, group_id).await?;
            let usage = self.recorded_usage_minutes(&db_tx, group_id).await?;
            let group_usage_minutes: i64 = shares
                .iter()
                .filter_map(|share| usage.get(&share.user_id))
                .sum();

            let members = shares
                .into_iter()
                .map(|share| {
                    let usage_minutes = usage.get(&share.user_id).copied().unwrap_or(0);
                    let usage_ratio = if group_usage_minutes > 0 {
                        usage_minutes as f64 / group_usage_minutes as f64
                    } else {
                        0.0
                    };
                    let ownership_pct = share.percentage * 100.0;
                    let usage_pct = usage_ratio * 100.0;
                    let difference = ownership_pct - usage_pct;
                    MemberUsage {
                        user_id: share.user_id,
                        usage_minutes,
                        ownership_pct,
                        usage_pct,
                        difference,
                        is_fair: difference.abs() < FAIRNESS_THRESHOLD_POINTS,
                    }
                })
                .collect();

            Ok(UsageReport {
                group_id,
                group_name: group.name,
                group_usage_minutes,
                members,
            })
        })
    }
}
