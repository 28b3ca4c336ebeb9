//! Booking intervals and usage priority.
//!
//! Bookings are half-open `[start, end)` intervals: a booking ending at
//! 11:00 and one starting at 11:00 do not conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Cancelled bookings release their slot.
    pub fn holds_slot(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// PENDING -> CONFIRMED -> CANCELLED, and PENDING may be cancelled directly.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

impl TryFrom<&str> for BookingStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid booking status: {other}"
            ))),
        }
    }
}

/// An existing reservation of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Fails with [`EngineError::InvalidRange`] unless `end > start`.
pub fn ensure_valid_range(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultEngine<()> {
    if end <= start {
        return Err(EngineError::InvalidRange(
            "end time must be after start time".to_string(),
        ));
    }
    Ok(())
}

/// Returns `true` when `[start, end)` intersects any reservation still
/// holding its slot.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use engine::{BookingStatus, Reservation, overlaps};
///
/// let at = |h| Utc.with_ymd_and_hms(2030, 1, 1, h, 0, 0).unwrap();
/// let existing = [Reservation { start: at(9), end: at(11), status: BookingStatus::Confirmed }];
/// assert!(overlaps(&existing, at(10), at(12)).unwrap());
/// assert!(!overlaps(&existing, at(11), at(13)).unwrap());
/// ```
pub fn overlaps(
    existing: &[Reservation],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ResultEngine<bool> {
    ensure_valid_range(start, end)?;
    Ok(existing
        .iter()
        .any(|r| r.status.holds_slot() && r.start < end && start < r.end))
}

/// Fairness signal: ownership share minus share of recent group usage.
///
/// Both percentages are fractions in `0..=1`. When the group has no recorded
/// usage the usage share is 0.
pub fn priority(ownership_pct: f64, user_usage_minutes: i64, group_usage_minutes: i64) -> f64 {
    let usage_pct = if group_usage_minutes > 0 {
        user_usage_minutes as f64 / group_usage_minutes as f64
    } else {
        0.0
    };
    ownership_pct - usage_pct
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.1 {
            Self::High
        } else if score > -0.1 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 1, hour, 0, 0).unwrap()
    }

    fn confirmed(start: u32, end: u32) -> Reservation {
        Reservation {
            start: at(start),
            end: at(end),
            status: BookingStatus::Confirmed,
        }
    }

    #[test]
    fn overlapping_candidate_conflicts() {
        assert!(overlaps(&[confirmed(9, 11)], at(10), at(12)).unwrap());
        assert!(overlaps(&[confirmed(9, 11)], at(8), at(10)).unwrap());
        assert!(overlaps(&[confirmed(9, 11)], at(8), at(12)).unwrap());
        assert!(overlaps(&[confirmed(9, 11)], at(9), at(10)).unwrap());
    }

    #[test]
    fn adjacent_intervals_do_not_conflict() {
        assert!(!overlaps(&[confirmed(9, 11)], at(11), at(13)).unwrap());
        assert!(!overlaps(&[confirmed(11, 13)], at(9), at(11)).unwrap());
    }

    #[test]
    fn overlap_is_symmetric() {
        let pairs = [(9, 11, 10, 12), (9, 11, 11, 13), (8, 20, 10, 11), (1, 2, 3, 4)];
        for (a0, a1, b0, b1) in pairs {
            let ab = overlaps(&[confirmed(a0, a1)], at(b0), at(b1)).unwrap();
            let ba = overlaps(&[confirmed(b0, b1)], at(a0), at(a1)).unwrap();
            assert_eq!(ab, ba, "[{a0},{a1}) vs [{b0},{b1})");
        }
    }

    #[test]
    fn cancelled_reservations_are_ignored() {
        let cancelled = Reservation {
            status: BookingStatus::Cancelled,
            ..confirmed(9, 11)
        };
        assert!(!overlaps(&[cancelled], at(10), at(12)).unwrap());

        let pending = Reservation {
            status: BookingStatus::Pending,
            ..confirmed(9, 11)
        };
        assert!(overlaps(&[cancelled, pending], at(10), at(12)).unwrap());
    }

    #[test]
    fn empty_or_inverted_range_is_rejected() {
        let err = overlaps(&[], at(10), at(10)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange(_)));
        assert!(overlaps(&[], at(10), at(9)).is_err());
        assert!(!overlaps(&[], at(10), at(10) + Duration::minutes(1)).unwrap());
    }

    #[test]
    fn priority_is_ownership_minus_usage() {
        assert!((priority(0.5, 30, 100) - 0.2).abs() < 1e-9);
        assert!((priority(0.25, 100, 100) + 0.75).abs() < 1e-9);
    }

    #[test]
    fn priority_without_group_usage_is_ownership() {
        assert_eq!(priority(0.4, 0, 0), 0.4);
        assert_eq!(priority(0.4, 10, 0), 0.4);
    }

    #[test]
    fn priority_levels_use_tenth_thresholds() {
        assert_eq!(PriorityLevel::from_score(0.11), PriorityLevel::High);
        assert_eq!(PriorityLevel::from_score(0.1), PriorityLevel::Medium);
        assert_eq!(PriorityLevel::from_score(-0.05), PriorityLevel::Medium);
        assert_eq!(PriorityLevel::from_score(-0.1), PriorityLevel::Low);
    }

    #[test]
    fn booking_transitions_follow_lifecycle() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }
}
