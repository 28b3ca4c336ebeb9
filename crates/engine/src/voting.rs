//! Group votes: methods, statuses and the closing tally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EngineError;

pub const DEFAULT_OPTIONS: [&str; 2] = ["YES", "NO"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VotingMethod {
    SimpleMajority,
    Unanimous,
    OwnershipWeighted,
}

impl VotingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SimpleMajority => "SIMPLE_MAJORITY",
            Self::Unanimous => "UNANIMOUS",
            Self::OwnershipWeighted => "OWNERSHIP_WEIGHTED",
        }
    }
}

impl TryFrom<&str> for VotingMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "SIMPLE_MAJORITY" => Ok(Self::SimpleMajority),
            "UNANIMOUS" => Ok(Self::Unanimous),
            "OWNERSHIP_WEIGHTED" => Ok(Self::OwnershipWeighted),
            other => Err(EngineError::InvalidInput(format!(
                "invalid voting method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteStatus {
    Open,
    Closed,
}

impl VoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    /// Status as seen by readers: an open vote past its deadline reads as closed.
    pub fn effective(self, deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        match self {
            Self::Open if now >= deadline => Self::Closed,
            other => other,
        }
    }
}

impl TryFrom<&str> for VoteStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid vote status: {other}"
            ))),
        }
    }
}

/// A cast ballot. `weight` is the voter's ownership percentage.
#[derive(Clone, Debug, PartialEq)]
pub struct Ballot {
    pub choice: String,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TallyOutcome {
    /// Score per option, in option order.
    pub scores: Vec<(String, f64)>,
    /// `None` on a tie, without ballots, or when unanimity is not reached.
    pub winner: Option<String>,
}

/// Counts ballots according to `method`.
pub fn tally(method: VotingMethod, options: &[String], ballots: &[Ballot]) -> TallyOutcome {
    let weight_of = |ballot: &Ballot| match method {
        VotingMethod::OwnershipWeighted => ballot.weight,
        VotingMethod::SimpleMajority | VotingMethod::Unanimous => 1.0,
    };

    let scores: Vec<(String, f64)> = options
        .iter()
        .map(|option| {
            let score = ballots
                .iter()
                .filter(|b| &b.choice == option)
                .map(weight_of)
                .sum::<f64>();
            (option.clone(), score)
        })
        .collect();

    let winner = match method {
        VotingMethod::Unanimous => ballots.first().and_then(|first| {
            ballots
                .iter()
                .all(|b| b.choice == first.choice)
                .then(|| first.choice.clone())
        }),
        VotingMethod::SimpleMajority | VotingMethod::OwnershipWeighted => {
            strict_leader(&scores)
        }
    };

    TallyOutcome { scores, winner }
}

fn strict_leader(scores: &[(String, f64)]) -> Option<String> {
    let (best_idx, best) = scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.1.total_cmp(&b.1.1))?;
    if best.1 <= 0.0 {
        return None;
    }
    let tied = scores
        .iter()
        .enumerate()
        .any(|(idx, (_, score))| idx != best_idx && (score - best.1).abs() < 1e-9);
    (!tied).then(|| best.0.clone())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn options() -> Vec<String> {
        DEFAULT_OPTIONS.iter().map(|s| s.to_string()).collect()
    }

    fn ballot(choice: &str, weight: f64) -> Ballot {
        Ballot {
            choice: choice.to_string(),
            weight,
        }
    }

    #[test]
    fn simple_majority_counts_heads() {
        let ballots = [ballot("YES", 0.1), ballot("YES", 0.1), ballot("NO", 0.8)];
        let outcome = tally(VotingMethod::SimpleMajority, &options(), &ballots);
        assert_eq!(outcome.winner.as_deref(), Some("YES"));
        assert_eq!(outcome.scores[0], ("YES".to_string(), 2.0));
    }

    #[test]
    fn ownership_weighted_counts_shares() {
        let ballots = [ballot("YES", 0.1), ballot("YES", 0.1), ballot("NO", 0.8)];
        let outcome = tally(VotingMethod::OwnershipWeighted, &options(), &ballots);
        assert_eq!(outcome.winner.as_deref(), Some("NO"));
    }

    #[test]
    fn tie_has_no_winner() {
        let ballots = [ballot("YES", 0.5), ballot("NO", 0.5)];
        assert_eq!(
            tally(VotingMethod::SimpleMajority, &options(), &ballots).winner,
            None
        );
        assert_eq!(tally(VotingMethod::SimpleMajority, &options(), &[]).winner, None);
    }

    #[test]
    fn unanimous_needs_every_ballot() {
        let agree = [ballot("YES", 0.5), ballot("YES", 0.5)];
        let split = [ballot("YES", 0.9), ballot("NO", 0.1)];
        assert_eq!(
            tally(VotingMethod::Unanimous, &options(), &agree).winner.as_deref(),
            Some("YES")
        );
        assert_eq!(tally(VotingMethod::Unanimous, &options(), &split).winner, None);
    }

    #[test]
    fn open_vote_reads_closed_after_deadline() {
        let now = Utc::now();
        assert_eq!(
            VoteStatus::Open.effective(now - Duration::minutes(1), now),
            VoteStatus::Closed
        );
        assert_eq!(
            VoteStatus::Open.effective(now + Duration::minutes(1), now),
            VoteStatus::Open
        );
    }
}
