//! Domain engine for shared EV co-ownership.
//!
//! Groups of users jointly own vehicles, reserve them through bookings, split
//! costs through expenses and expense shares, keep a common fund, vote on
//! decisions and raise disputes. Every operation is a method on [`Engine`]
//! taking the calling [`Actor`] explicitly and running inside one database
//! transaction.
//!
//! The pure pieces live in their own modules and are usable without a
//! database: [`allocate`], [`overlaps`], [`priority`], [`tally`] and
//! [`permits`].

pub use allocation::{Allocation, SplitMethod, allocate};
pub use bookings::Booking;
pub use commands::{
    FundMovementCmd, NewContractCmd, NewDisputeCmd, NewExpenseCmd, NewFundCmd, NewVehicleCmd,
    NewVoteCmd, PayShareCmd,
};
pub use common_funds::{CommonFund, FundType};
pub use disputes::{Dispute, DisputeCategory, DisputeStatus};
pub use econtracts::{ContractStatus, EContract};
pub use error::EngineError;
pub use expense_shares::{ExpenseShare, ShareStatus};
pub use expenses::{Expense, ExpenseStatus, ExpenseType};
pub use fund_transactions::{FundTransaction, FundTransactionKind};
pub use groups::Group;
pub use money::MoneyCents;
pub use ops::{
    BookingPriority, Engine, EngineBuilder, ExpenseWithShares, FinancialReport, MemberUsage,
    UsageReport, UserExpenseReport,
};
pub use ownership_shares::{Member, OWNERSHIP_EPSILON};
pub use password::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
pub use payments::{Payment, PaymentMethod, PaymentStatus};
pub use permissions::{Action, Actor, Role, RoleSet, permits};
pub use scheduling::{
    BookingStatus, PriorityLevel, Reservation, ensure_valid_range, overlaps, priority,
};
pub use usage_histories::UsageHistory;
pub use users::User;
pub use vehicles::Vehicle;
pub use votes::{Vote, VoteChoice};
pub use voting::{
    Ballot, DEFAULT_OPTIONS, TallyOutcome, VoteStatus, VotingMethod, tally,
};

mod allocation;
mod bookings;
mod commands;
mod common_funds;
mod disputes;
mod econtracts;
mod error;
mod expense_shares;
mod expenses;
mod fund_transactions;
mod groups;
mod money;
mod ops;
mod ownership_shares;
mod password;
mod payments;
mod permissions;
mod scheduling;
mod usage_histories;
mod user_roles;
mod user_votes;
mod users;
mod util;
mod vehicles;
mod vote_options;
mod votes;
mod voting;

type ResultEngine<T> = Result<T, EngineError>;
