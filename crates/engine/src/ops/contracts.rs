use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Action, Actor, ContractStatus, EContract, EngineError, NewContractCmd, ResultEngine,
    econtracts,
    util::{normalize_optional_text, normalize_required},
};

use super::{Engine, with_tx};

impl Engine {
    /// Drafts a contract for a group (staff only). Contract numbers are unique.
    pub async fn create_contract(
        &self,
        actor: &Actor,
        cmd: NewContractCmd,
    ) -> ResultEngine<EContract> {
        actor.require(Action::CreateContract)?;
        let contract_no = normalize_required(&cmd.contract_no, "contract number")?;
        if cmd.end_date < cmd.start_date {
            return Err(EngineError::InvalidRange(
                "contract end date is before its start date".to_string(),
            ));
        }
        let terms = normalize_optional_text(cmd.terms.as_deref());
        let document_url = normalize_optional_text(cmd.document_url.as_deref());

        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, cmd.group_id).await?;
            let clash = econtracts::Entity::find()
                .filter(econtracts::Column::ContractNo.eq(contract_no.clone()))
                .one(&db_tx)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(contract_no));
            }

            let model = econtracts::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group.id),
                contract_no: ActiveValue::Set(contract_no),
                start_date: ActiveValue::Set(cmd.start_date),
                end_date: ActiveValue::Set(cmd.end_date),
                status: ActiveValue::Set(ContractStatus::Draft.as_str().to_string()),
                terms: ActiveValue::Set(terms),
                document_url: ActiveValue::Set(document_url),
                created_by: ActiveValue::Set(actor.user_id),
                created_at: ActiveValue::Set(self.now()),
                signed_at: ActiveValue::Set(None),
                signed_by: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            EContract::try_from(model)
        })
    }

    /// Signs a draft contract on behalf of the group.
    pub async fn sign_contract(&self, actor: &Actor, contract_id: Uuid) -> ResultEngine<EContract> {
        actor.require(Action::SignContract)?;
        with_tx!(self, |db_tx| {
            let model = self.require_contract(&db_tx, contract_id).await?;
            self.require_group_member(&db_tx, model.group_id, actor)
                .await?;
            if model.status != ContractStatus::Draft.as_str() {
                return Err(EngineError::Conflict("contract already signed".to_string()));
            }
            let mut active: econtracts::ActiveModel = model.into();
            active.status = ActiveValue::Set(ContractStatus::Signed.as_str().to_string());
            active.signed_at = ActiveValue::Set(Some(self.now()));
            active.signed_by = ActiveValue::Set(Some(actor.user_id));
            EContract::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn get_contract(&self, actor: &Actor, contract_id: Uuid) -> ResultEngine<EContract> {
        with_tx!(self, |db_tx| {
            let model = self.require_contract(&db_tx, contract_id).await?;
            self.require_group_access(&db_tx, model.group_id, actor)
                .await?;
            EContract::try_from(model)
        })
    }

    pub async fn list_group_contracts(
        &self,
        actor: &Actor,
        group_id: Uuid,
    ) -> ResultEngine<Vec<EContract>> {
        with_tx!(self, |db_tx| {
            self.require_group_access(&db_tx, group_id, actor).await?;
            let models = econtracts::Entity::find()
                .filter(econtracts::Column::GroupId.eq(group_id))
                .order_by_desc(econtracts::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(EContract::try_from).collect()
        })
    }
}
