//! Roles, actions and the single permission check.
//!
//! Every engine operation receives an [`Actor`] built by the caller from the
//! authenticated request. Role-level checks go through [`permits`]; group
//! membership checks live next to the operations that need them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
    CoOwner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Staff => "STAFF",
            Self::CoOwner => "CO_OWNER",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "ADMIN" => Ok(Self::Admin),
            "STAFF" => Ok(Self::Staff),
            "CO_OWNER" => Ok(Self::CoOwner),
            other => Err(EngineError::InvalidInput(format!("invalid role: {other}"))),
        }
    }
}

/// The roles held by one user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// ADMIN or STAFF.
    pub fn is_staff(&self) -> bool {
        self.contains(Role::Admin) || self.contains(Role::Staff)
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Role-gated actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    CreateGroup,
    CreateBooking,
    CreateExpense,
    PayShare,
    ManageFund,
    CreateVote,
    CastVote,
    OpenDispute,
    SignContract,
    UpdateBookingStatus,
    UpdatePaymentStatus,
    ManageAnyVehicle,
    ViewAnyGroup,
    ViewAnyUser,
    ReviewDispute,
    ResolveDispute,
    CloseDispute,
    ListAllDisputes,
    CreateContract,
    CheckIn,
    CheckOut,
    AdminListing,
    DeleteAnyGroup,
    CloseAnyVote,
}

/// Decides whether a role set may perform `action`.
///
/// Co-owner actions are open to every authenticated role; group membership is
/// checked separately by the operation. Staff actions need ADMIN or STAFF.
/// Admin actions need ADMIN.
pub fn permits(roles: &RoleSet, action: Action) -> bool {
    match action {
        Action::CreateGroup
        | Action::CreateBooking
        | Action::CreateExpense
        | Action::PayShare
        | Action::ManageFund
        | Action::CreateVote
        | Action::CastVote
        | Action::OpenDispute
        | Action::SignContract => !roles.is_empty(),
        Action::UpdateBookingStatus
        | Action::UpdatePaymentStatus
        | Action::ManageAnyVehicle
        | Action::ViewAnyGroup
        | Action::ViewAnyUser
        | Action::ReviewDispute
        | Action::ResolveDispute
        | Action::CloseDispute
        | Action::ListAllDisputes
        | Action::CreateContract
        | Action::CheckIn
        | Action::CheckOut => roles.is_staff(),
        Action::AdminListing | Action::DeleteAnyGroup | Action::CloseAnyVote => {
            roles.contains(Role::Admin)
        }
    }
}

/// The authenticated caller of an engine operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub roles: RoleSet,
}

impl Actor {
    pub fn new(user_id: Uuid, roles: RoleSet) -> Self {
        Self { user_id, roles }
    }

    pub fn can(&self, action: Action) -> bool {
        permits(&self.roles, action)
    }

    pub fn require(&self, action: Action) -> ResultEngine<()> {
        if !self.can(action) {
            return Err(EngineError::Forbidden(format!("not allowed: {action:?}")));
        }
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(list: &[Role]) -> RoleSet {
        list.iter().copied().collect()
    }

    #[test]
    fn co_owner_can_use_group_features() {
        let set = roles(&[Role::CoOwner]);
        assert!(permits(&set, Action::CreateGroup));
        assert!(permits(&set, Action::CreateBooking));
        assert!(permits(&set, Action::CastVote));
        assert!(!permits(&set, Action::CheckIn));
        assert!(!permits(&set, Action::AdminListing));
    }

    #[test]
    fn staff_actions_need_admin_or_staff() {
        for action in [Action::CheckIn, Action::ResolveDispute, Action::CreateContract] {
            assert!(permits(&roles(&[Role::Staff]), action));
            assert!(permits(&roles(&[Role::Admin]), action));
            assert!(!permits(&roles(&[Role::CoOwner]), action));
        }
    }

    #[test]
    fn admin_listing_is_admin_only() {
        assert!(permits(&roles(&[Role::Admin]), Action::AdminListing));
        assert!(!permits(&roles(&[Role::Staff]), Action::AdminListing));
    }

    #[test]
    fn empty_role_set_is_denied_everything() {
        let set = RoleSet::new();
        assert!(!permits(&set, Action::CreateGroup));
        assert!(!permits(&set, Action::CheckOut));
    }

    #[test]
    fn actor_require_returns_forbidden() {
        let actor = Actor::new(Uuid::new_v4(), roles(&[Role::CoOwner]));
        assert!(actor.require(Action::CreateExpense).is_ok());
        assert!(matches!(
            actor.require(Action::UpdatePaymentStatus),
            Err(EngineError::Forbidden(_))
        ));
    }

    #[test]
    fn role_names_round_trip() {
        for role in [Role::Admin, Role::Staff, Role::CoOwner] {
            assert_eq!(Role::try_from(role.as_str()).unwrap(), role);
        }
        assert!(Role::try_from("OWNER").is_err());
    }
}
