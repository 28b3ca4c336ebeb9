//! Request and response bodies of the HTTP API.
//!
//! Money travels as decimal strings with two places (`"12.50"`), timestamps as
//! RFC3339 and enumerations as their upper-case names (`"BY_OWNERSHIP"`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error {
    use super::*;

    /// Uniform error body returned by every failing request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub timestamp: DateTime<Utc>,
        /// `VALIDATION_ERROR`, `UNAUTHORIZED`, `FORBIDDEN`, `NOT_FOUND`,
        /// `CONFLICT_ERROR` or `INTERNAL_ERROR`.
        pub code: String,
        pub message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub details: Option<String>,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub token_type: String,
        pub expires_at: DateTime<Utc>,
        pub user: user::UserView,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub username: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub email: String,
        pub roles: Vec<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
    }

    /// Ownership percentage in `(0, 1]`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub user_id: Uuid,
        pub percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberUpdate {
        pub percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub group_id: Uuid,
        pub user_id: Uuid,
        pub percentage: f64,
        pub joined_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnerTransfer {
        pub new_owner_id: Uuid,
    }
}

pub mod vehicle {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleNew {
        pub group_id: Uuid,
        pub vin: String,
        pub plate: String,
        pub model: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub vin: String,
        pub plate: String,
        pub model: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod booking {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingNew {
        pub vehicle_id: Uuid,
        pub start_time: DateTime<Utc>,
        pub end_time: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingStatusUpdate {
        /// `PENDING`, `CONFIRMED` or `CANCELLED`.
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub vehicle_id: Uuid,
        pub user_id: Uuid,
        pub start_time: DateTime<Utc>,
        pub end_time: DateTime<Utc>,
        pub status: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PriorityView {
        pub group_id: Uuid,
        pub user_id: Uuid,
        pub ownership_percentage: f64,
        pub user_usage_minutes: i64,
        pub group_usage_minutes: i64,
        pub priority_score: f64,
        /// `high`, `medium` or `low`.
        pub priority_level: String,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub group_id: Uuid,
        pub vehicle_id: Option<Uuid>,
        /// `CHARGING`, `MAINTENANCE`, `INSURANCE`, `INSPECTION`, `CLEANING`
        /// or `OTHER`.
        pub expense_type: String,
        pub amount: String,
        pub date: NaiveDate,
        pub description: Option<String>,
        /// `BY_OWNERSHIP`, `EQUAL` or `BY_USAGE`.
        pub split_method: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub vehicle_id: Option<Uuid>,
        pub created_by: Uuid,
        pub expense_type: String,
        pub amount: String,
        pub date: NaiveDate,
        pub description: Option<String>,
        pub split_method: String,
        pub status: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub id: Uuid,
        pub expense_id: Uuid,
        pub user_id: Uuid,
        pub amount: String,
        pub paid_amount: String,
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub expense: ExpenseView,
        pub shares: Vec<ShareView>,
    }
}

pub mod payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub expense_share_id: Uuid,
        pub amount: String,
        /// `E_WALLET`, `BANKING` or `CASH`.
        pub method: String,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentStatusUpdate {
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub expense_share_id: Uuid,
        pub user_id: Uuid,
        pub amount: String,
        pub method: String,
        pub status: String,
        pub transaction_ref: String,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
        pub completed_at: Option<DateTime<Utc>>,
    }
}

pub mod fund {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundNew {
        pub group_id: Uuid,
        /// `MAINTENANCE_RESERVE`, `EMERGENCY` or `OTHER`.
        pub fund_type: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundMovement {
        pub amount: String,
        pub description: Option<String>,
        pub reference: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub fund_type: String,
        pub balance: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundTransactionView {
        pub id: Uuid,
        pub fund_id: Uuid,
        /// `DEPOSIT` or `WITHDRAW`.
        pub kind: String,
        pub amount: String,
        pub occurred_at: DateTime<Utc>,
        pub created_by: Uuid,
        pub description: Option<String>,
        pub reference: Option<String>,
    }
}

pub mod vote {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoteNew {
        pub group_id: Uuid,
        pub topic: String,
        pub description: Option<String>,
        pub deadline: DateTime<Utc>,
        /// Defaults to `SIMPLE_MAJORITY`.
        pub voting_method: Option<String>,
        /// Defaults to `["YES", "NO"]`.
        #[serde(default)]
        pub options: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoteCast {
        pub option: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OptionView {
        pub label: String,
        pub count: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoteView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub topic: String,
        pub description: Option<String>,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
        pub deadline: DateTime<Utc>,
        pub status: String,
        pub voting_method: String,
        pub result: Option<String>,
        pub options: Vec<OptionView>,
    }
}

pub mod dispute {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DisputeNew {
        pub group_id: Uuid,
        pub title: String,
        pub description: String,
        /// Defaults to `OTHER`.
        pub category: Option<String>,
        pub related_booking_id: Option<Uuid>,
        pub related_expense_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DisputeResolve {
        pub resolution: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DisputeView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub created_by: Uuid,
        pub title: String,
        pub description: String,
        pub category: String,
        pub status: String,
        pub related_booking_id: Option<Uuid>,
        pub related_expense_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub resolved_at: Option<DateTime<Utc>>,
        pub resolved_by: Option<Uuid>,
        pub resolution: Option<String>,
    }
}

pub mod contract {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContractNew {
        pub group_id: Uuid,
        pub contract_no: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub terms: Option<String>,
        pub document_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContractView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub contract_no: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub status: String,
        pub terms: Option<String>,
        pub document_url: Option<String>,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
        pub signed_at: Option<DateTime<Utc>>,
        pub signed_by: Option<Uuid>,
    }
}

pub mod usage {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckIn {
        pub booking_id: Uuid,
        pub start_odometer: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckOut {
        pub end_odometer: i32,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsageView {
        pub id: Uuid,
        pub booking_id: Uuid,
        pub vehicle_id: Uuid,
        pub user_id: Uuid,
        pub start_time: DateTime<Utc>,
        pub end_time: DateTime<Utc>,
        pub start_odometer: i32,
        pub end_odometer: Option<i32>,
        pub distance: Option<i32>,
        pub notes: Option<String>,
        pub checked_in_by: Uuid,
        pub checked_in_at: DateTime<Utc>,
        pub checked_out_by: Option<Uuid>,
        pub checked_out_at: Option<DateTime<Utc>>,
        pub check_in_qr: String,
        pub check_out_qr: Option<String>,
    }
}

pub mod report {
    use super::*;

    /// Inclusive date range of a report.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DateRange {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TypeTotal {
        pub expense_type: String,
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FinancialReportView {
        pub group_id: Uuid,
        pub group_name: String,
        pub from: NaiveDate,
        pub to: NaiveDate,
        pub total_expenses: String,
        pub expenses_by_type: Vec<TypeTotal>,
        pub expense_count: usize,
        pub paid_expenses: usize,
        pub pending_expenses: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserExpenseReportView {
        pub user_id: Uuid,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub total_owed: String,
        pub total_paid: String,
        pub total_pending: String,
        pub expense_share_count: usize,
        pub paid_count: usize,
        pub pending_count: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberUsageView {
        pub user_id: Uuid,
        pub usage_minutes: i64,
        pub ownership_percentage: f64,
        pub usage_percentage: f64,
        pub difference: f64,
        pub is_fair: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsageReportView {
        pub group_id: Uuid,
        pub group_name: String,
        pub group_usage_minutes: i64,
        pub members: Vec<MemberUsageView>,
    }
}
