//! Vote API endpoints

use api_types::vote::{VoteCast, VoteNew, VoteView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{NewVoteCmd, User, VotingMethod};

use crate::{Created, IdPath, JsonBody, ServerError, server::ServerState, views};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<VoteNew>,
) -> Result<Created<VoteView>, ServerError> {
    let mut cmd = NewVoteCmd::new(payload.group_id, payload.topic, payload.deadline)
        .options(payload.options);
    if let Some(method) = payload.voting_method {
        cmd = cmd.voting_method(VotingMethod::try_from(method.as_str())?);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let vote = state.engine.create_vote(&user.actor(), cmd).await?;
    Ok((StatusCode::CREATED, Json(views::vote(vote))))
}

pub async fn list_for_group(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(group_id), _): IdPath,
) -> Result<Json<Vec<VoteView>>, ServerError> {
    let votes = state
        .engine
        .list_group_votes(&user.actor(), group_id)
        .await?;
    Ok(Json(views::list(votes, views::vote)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<VoteView>, ServerError> {
    let vote = state.engine.get_vote(&user.actor(), id).await?;
    Ok(Json(views::vote(vote)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_vote(&user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cast(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<VoteCast>,
) -> Result<Json<VoteView>, ServerError> {
    let vote = state
        .engine
        .cast_vote(&user.actor(), id, &payload.option)
        .await?;
    Ok(Json(views::vote(vote)))
}

/// Close the vote and store the tally winner
pub async fn close(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<VoteView>, ServerError> {
    let vote = state.engine.close_vote(&user.actor(), id).await?;
    tracing::info!(vote_id = %id, result = ?vote.result, "vote closed");
    Ok(Json(views::vote(vote)))
}
