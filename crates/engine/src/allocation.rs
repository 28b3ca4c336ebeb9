//! Expense allocation.
//!
//! Splits an expense total across the members of a group. Every share is
//! rounded to the cent on its own with HALF_UP (midpoint away from zero).
//! Rounding drift is kept: the shares may differ from the total by up to one
//! cent per member.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// How an expense is divided among the members of its group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitMethod {
    /// Proportional to each member's ownership percentage.
    ByOwnership,
    /// Same amount for every member.
    Equal,
    /// Proportional to usage. Not tracked yet: behaves like [`SplitMethod::Equal`].
    ByUsage,
}

impl SplitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByOwnership => "BY_OWNERSHIP",
            Self::Equal => "EQUAL",
            Self::ByUsage => "BY_USAGE",
        }
    }
}

impl TryFrom<&str> for SplitMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "BY_OWNERSHIP" => Ok(Self::ByOwnership),
            "EQUAL" => Ok(Self::Equal),
            "BY_USAGE" => Ok(Self::ByUsage),
            other => Err(EngineError::InvalidInput(format!(
                "invalid split method: {other}"
            ))),
        }
    }
}

/// One member's owed portion of an expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub user_id: Uuid,
    pub amount: MoneyCents,
}

/// Splits `total` across `members`.
///
/// `members` carries `(user_id, weight)` pairs; the weight is the ownership
/// percentage in `0..=1` and is only read by [`SplitMethod::ByOwnership`].
/// Weights are not required to sum to 1: a member's share is
/// `round(total * weight)` whatever the other weights are.
///
/// # Errors
///
/// [`EngineError::InvalidInput`] when `members` is empty or a weight is
/// negative or not finite.
///
/// # Examples
///
/// ```rust
/// use engine::{MoneyCents, SplitMethod, allocate};
/// use uuid::Uuid;
///
/// let members = [(Uuid::new_v4(), 0.0), (Uuid::new_v4(), 0.0), (Uuid::new_v4(), 0.0)];
/// let shares = allocate(MoneyCents::new(100_00), SplitMethod::Equal, &members).unwrap();
/// let cents: Vec<i64> = shares.iter().map(|s| s.amount.cents()).collect();
/// assert_eq!(cents, vec![33_33, 33_33, 33_33]);
/// ```
pub fn allocate(
    total: MoneyCents,
    method: SplitMethod,
    members: &[(Uuid, f64)],
) -> ResultEngine<Vec<Allocation>> {
    if members.is_empty() {
        return Err(EngineError::InvalidInput(
            "cannot split an expense across zero members".to_string(),
        ));
    }

    let total_dec = Decimal::from(total.cents());
    let amounts = match method {
        SplitMethod::ByOwnership => members
            .iter()
            .map(|(_, weight)| round_half_up(total_dec * weight_to_decimal(*weight)?))
            .collect::<ResultEngine<Vec<i64>>>()?,
        SplitMethod::Equal | SplitMethod::ByUsage => {
            let per_member = round_half_up(total_dec / Decimal::from(members.len()))?;
            vec![per_member; members.len()]
        }
    };

    Ok(members
        .iter()
        .zip(amounts)
        .map(|((user_id, _), cents)| Allocation {
            user_id: *user_id,
            amount: MoneyCents::new(cents),
        })
        .collect())
}

fn weight_to_decimal(weight: f64) -> ResultEngine<Decimal> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "invalid ownership weight: {weight}"
        )));
    }
    // Shortest round-trip text keeps 0.3 as 0.3 instead of its binary expansion.
    Decimal::from_str(&weight.to_string())
        .map_err(|_| EngineError::InvalidInput(format!("invalid ownership weight: {weight}")))
}

fn round_half_up(value: Decimal) -> ResultEngine<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
}
