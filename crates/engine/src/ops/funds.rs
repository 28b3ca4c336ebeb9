use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Action, Actor, CommonFund, EngineError, FundMovementCmd, FundTransaction,
    FundTransactionKind, MoneyCents, NewFundCmd, ResultEngine, common_funds, fund_transactions,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Opens an empty fund for a group the actor belongs to.
    pub async fn create_fund(&self, actor: &Actor, cmd: NewFundCmd) -> ResultEngine<CommonFund> {
        actor.require(Action::ManageFund)?;
        let description = normalize_optional_text(cmd.description.as_deref());
        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, cmd.group_id, actor).await?;
            let model = common_funds::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group.id),
                fund_type: ActiveValue::Set(cmd.fund_type.as_str().to_string()),
                balance_minor: ActiveValue::Set(0),
                description: ActiveValue::Set(description),
                created_at: ActiveValue::Set(self.now()),
            }
            .insert(&db_tx)
            .await?;
            CommonFund::try_from(model)
        })
    }

    pub async fn deposit(&self, actor: &Actor, cmd: FundMovementCmd) -> ResultEngine<CommonFund> {
        self.move_funds(actor, cmd, FundTransactionKind::Deposit)
            .await
    }

    /// Fails with `InsufficientFunds` when the balance does not cover `amount`.
    pub async fn withdraw(&self, actor: &Actor, cmd: FundMovementCmd) -> ResultEngine<CommonFund> {
        self.move_funds(actor, cmd, FundTransactionKind::Withdraw)
            .await
    }

    /// Balance update and ledger row are written in one transaction.
    async fn move_funds(
        &self,
        actor: &Actor,
        cmd: FundMovementCmd,
        kind: FundTransactionKind,
    ) -> ResultEngine<CommonFund> {
        actor.require(Action::ManageFund)?;
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        let description = normalize_optional_text(cmd.description.as_deref());
        let reference = normalize_optional_text(cmd.reference.as_deref());

        with_tx!(self, |db_tx| {
            let fund = self.require_fund(&db_tx, cmd.fund_id).await?;
            self.require_group_member(&db_tx, fund.group_id, actor)
                .await?;

            let balance = MoneyCents::new(fund.balance_minor);
            let new_balance = match kind {
                FundTransactionKind::Deposit => balance.checked_add(cmd.amount).ok_or_else(|| {
                    EngineError::InvalidAmount("fund balance overflow".to_string())
                })?,
                FundTransactionKind::Withdraw => {
                    if balance < cmd.amount {
                        return Err(EngineError::InsufficientFunds(format!(
                            "balance {balance} is lower than {}",
                            cmd.amount
                        )));
                    }
                    balance - cmd.amount
                }
            };

            fund_transactions::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                fund_id: ActiveValue::Set(fund.id),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                occurred_at: ActiveValue::Set(self.now()),
                created_by: ActiveValue::Set(actor.user_id),
                description: ActiveValue::Set(description),
                reference: ActiveValue::Set(reference),
            }
            .insert(&db_tx)
            .await?;

            let mut active: common_funds::ActiveModel = fund.into();
            active.balance_minor = ActiveValue::Set(new_balance.cents());
            CommonFund::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn get_fund(&self, actor: &Actor, fund_id: Uuid) -> ResultEngine<CommonFund> {
        with_tx!(self, |db_tx| {
            let fund = self.require_fund_access(&db_tx, fund_id, actor).await?;
            CommonFund::try_from(fund)
        })
    }

    pub async fn list_group_funds(
        &self,
        actor: &Actor,
        group_id: Uuid,
    ) -> ResultEngine<Vec<CommonFund>> {
        with_tx!(self, |db_tx| {
            if !actor.is_admin() {
                self.require_group_member(&db_tx, group_id, actor).await?;
            } else {
                self.require_group(&db_tx, group_id).await?;
            }
            let models = common_funds::Entity::find()
                .filter(common_funds::Column::GroupId.eq(group_id))
                .order_by_asc(common_funds::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(CommonFund::try_from).collect()
        })
    }

    /// Ledger of a fund, newest first.
    pub async fn list_fund_transactions(
        &self,
        actor: &Actor,
        fund_id: Uuid,
    ) -> ResultEngine<Vec<FundTransaction>> {
        with_tx!(self, |db_tx| {
            self.require_fund_access(&db_tx, fund_id, actor).await?;
            let models = fund_transactions::Entity::find()
                .filter(fund_transactions::Column::FundId.eq(fund_id))
                .order_by_desc(fund_transactions::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(FundTransaction::try_from).collect()
        })
    }

    /// Funds are readable by group members and admins.
    async fn require_fund_access(
        &self,
        db: &DatabaseTransaction,
        fund_id: Uuid,
        actor: &Actor,
    ) -> ResultEngine<common_funds::Model> {
        let fund = self.require_fund(db, fund_id).await?;
        if !actor.is_admin() {
            self.require_group_member(db, fund.group_id, actor).await?;
        }
        Ok(fund)
    }
}
