use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Action, Actor, Ballot, DEFAULT_OPTIONS, EngineError, NewVoteCmd, ResultEngine, Vote,
    VoteStatus, VotingMethod, tally, user_votes, vote_options, votes,
    util::{normalize_optional_text, normalize_required},
};

use super::{Engine, with_tx};

/// Trims the requested options, falling back to YES/NO. At least two
/// distinct labels are required.
fn normalize_options(options: &[String]) -> ResultEngine<Vec<String>> {
    if options.is_empty() {
        return Ok(DEFAULT_OPTIONS.iter().map(ToString::to_string).collect());
    }
    let labels = options
        .iter()
        .map(|option| normalize_required(option, "vote option"))
        .collect::<ResultEngine<Vec<_>>>()?;
    let distinct: HashSet<&str> = labels.iter().map(String::as_str).collect();
    if distinct.len() != labels.len() {
        return Err(EngineError::InvalidInput(
            "vote options must be distinct".to_string(),
        ));
    }
    if labels.len() < 2 {
        return Err(EngineError::InvalidInput(
            "a vote needs at least two options".to_string(),
        ));
    }
    Ok(labels)
}

impl Engine {
    /// Opens a vote in a group the actor belongs to.
    pub async fn create_vote(&self, actor: &Actor, cmd: NewVoteCmd) -> ResultEngine<Vote> {
        actor.require(Action::CreateVote)?;
        let topic = normalize_required(&cmd.topic, "topic")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let labels = normalize_options(&cmd.options)?;
        let now = self.now();
        if cmd.deadline <= now {
            return Err(EngineError::InvalidInput(
                "deadline must be in the future".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let group = self.require_group_member(&db_tx, cmd.group_id, actor).await?;
            let vote = votes::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group.id),
                topic: ActiveValue::Set(topic),
                description: ActiveValue::Set(description),
                created_by: ActiveValue::Set(actor.user_id),
                created_at: ActiveValue::Set(now),
                deadline: ActiveValue::Set(cmd.deadline),
                status: ActiveValue::Set(VoteStatus::Open.as_str().to_string()),
                voting_method: ActiveValue::Set(cmd.voting_method.as_str().to_string()),
                result: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;

            let mut options = Vec::with_capacity(labels.len());
            for (position, label) in (0_i32..).zip(labels) {
                let option = vote_options::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    vote_id: ActiveValue::Set(vote.id),
                    label: ActiveValue::Set(label),
                    position: ActiveValue::Set(position),
                    count: ActiveValue::Set(0),
                }
                .insert(&db_tx)
                .await?;
                options.push(option);
            }
            Vote::from_model(vote, options, now)
        })
    }

    /// Records the actor's ballot. One ballot per member while the vote is open.
    pub async fn cast_vote(&self, actor: &Actor, vote_id: Uuid, choice: &str) -> ResultEngine<Vote> {
        actor.require(Action::CastVote)?;
        let choice = choice.trim();
        with_tx!(self, |db_tx| {
            let vote = self.require_vote(&db_tx, vote_id).await?;
            self.require_group_member(&db_tx, vote.group_id, actor)
                .await?;
            let now = self.now();
            let status = VoteStatus::try_from(vote.status.as_str())?.effective(vote.deadline, now);
            if status != VoteStatus::Open {
                return Err(EngineError::Conflict("vote is closed".to_string()));
            }

            let already = user_votes::Entity::find_by_id((vote_id, actor.user_id))
                .one(&db_tx)
                .await?;
            if already.is_some() {
                return Err(EngineError::Conflict("already voted".to_string()));
            }

            let options = self.vote_options(&db_tx, vote_id).await?;
            let Some(option) = options.iter().find(|o| o.label == choice).cloned() else {
                return Err(EngineError::InvalidInput(format!(
                    "invalid vote option: {choice}"
                )));
            };

            user_votes::ActiveModel {
                vote_id: ActiveValue::Set(vote_id),
                user_id: ActiveValue::Set(actor.user_id),
                choice: ActiveValue::Set(option.label.clone()),
                voted_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            let count = option.count + 1;
            let mut active: vote_options::ActiveModel = option.into();
            active.count = ActiveValue::Set(count);
            active.update(&db_tx).await?;

            let options = self.vote_options(&db_tx, vote_id).await?;
            Vote::from_model(vote, options, now)
        })
    }

    /// Closes a vote and stores the winning option (creator or admin).
    pub async fn close_vote(&self, actor: &Actor, vote_id: Uuid) -> ResultEngine<Vote> {
        with_tx!(self, |db_tx| {
            let vote = self.require_vote(&db_tx, vote_id).await?;
            if vote.created_by != actor.user_id {
                actor.require(Action::CloseAnyVote)?;
            }
            if vote.status == VoteStatus::Closed.as_str() {
                return Err(EngineError::Conflict("vote already closed".to_string()));
            }

            let method = VotingMethod::try_from(vote.voting_method.as_str())?;
            let options = self.vote_options(&db_tx, vote_id).await?;
            let labels: Vec<String> = options.iter().map(|o| o.label.clone()).collect();

            let weights: HashMap<Uuid, f64> = self
                .group_shares(&db_tx, vote.group_id)
                .await?
                .into_iter()
                .map(|share| (share.user_id, share.percentage))
                .collect();
            let ballots: Vec<Ballot> = user_votes::Entity::find()
                .filter(user_votes::Column::VoteId.eq(vote_id))
                .order_by_asc(user_votes::Column::VotedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|cast| Ballot {
                    weight: weights.get(&cast.user_id).copied().unwrap_or(0.0),
                    choice: cast.choice,
                })
                .collect();
            let outcome = tally(method, &labels, &ballots);

            let mut active: votes::ActiveModel = vote.into();
            active.status = ActiveValue::Set(VoteStatus::Closed.as_str().to_string());
            active.result = ActiveValue::Set(outcome.winner);
            let vote = active.update(&db_tx).await?;
            Vote::from_model(vote, options, self.now())
        })
    }

    /// Deletes an open vote nobody has voted on yet (creator only).
    pub async fn delete_vote(&self, actor: &Actor, vote_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let vote = self.require_vote(&db_tx, vote_id).await?;
            if vote.created_by != actor.user_id {
                return Err(EngineError::Forbidden(
                    "only the creator can delete a vote".to_string(),
                ));
            }
            let status =
                VoteStatus::try_from(vote.status.as_str())?.effective(vote.deadline, self.now());
            if status != VoteStatus::Open {
                return Err(EngineError::Conflict("vote is closed".to_string()));
            }
            let options = self.vote_options(&db_tx, vote_id).await?;
            if options.iter().any(|o| o.count > 0) {
                return Err(EngineError::Conflict(
                    "vote already has ballots".to_string(),
                ));
            }

            vote_options::Entity::delete_many()
                .filter(vote_options::Column::VoteId.eq(vote_id))
                .exec(&db_tx)
                .await?;
            votes::Entity::delete_by_id(vote_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn get_vote(&self, actor: &Actor, vote_id: Uuid) -> ResultEngine<Vote> {
        with_tx!(self, |db_tx| {
            let vote = self.require_vote(&db_tx, vote_id).await?;
            self.require_group_access(&db_tx, vote.group_id, actor)
                .await?;
            let options = self.vote_options(&db_tx, vote_id).await?;
            Vote::from_model(vote, options, self.now())
        })
    }

    /// Votes of a group, newest first.
    pub async fn list_group_votes(&self, actor: &Actor, group_id: Uuid) -> ResultEngine<Vec<Vote>> {
        with_tx!(self, |db_tx| {
            self.require_group_access(&db_tx, group_id, actor).await?;
            let models = votes::Entity::find()
                .filter(votes::Column::GroupId.eq(group_id))
                .order_by_desc(votes::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let now = self.now();
            let mut out = Vec::with_capacity(models.len());
            for vote in models {
                let options = self.vote_options(&db_tx, vote.id).await?;
                out.push(Vote::from_model(vote, options, now)?);
            }
            Ok(out)
        })
    }

    async fn vote_options(
        &self,
        db: &DatabaseTransaction,
        vote_id: Uuid,
    ) -> ResultEngine<Vec<vote_options::Model>> {
        Ok(vote_options::Entity::find()
            .filter(vote_options::Column::VoteId.eq(vote_id))
            .order_by_asc(vote_options::Column::Position)
            .all(db)
            .await?)
    }
}
