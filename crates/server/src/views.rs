//! Conversions from engine values to API bodies.

use api_types::{
    booking::{BookingView, PriorityView},
    contract::ContractView,
    dispute::DisputeView,
    expense::{ExpenseView, ShareView},
    fund::{FundTransactionView, FundView},
    group::{GroupView, MemberView},
    payment::PaymentView,
    report::{
        FinancialReportView, MemberUsageView, TypeTotal, UsageReportView, UserExpenseReportView,
    },
    usage::UsageView,
    user::UserView,
    vehicle::VehicleView,
    vote::{OptionView, VoteView},
};
use engine::{
    Booking, BookingPriority, CommonFund, Dispute, EContract, Expense, ExpenseShare,
    FinancialReport, FundTransaction, Group, Member, Payment, UsageHistory, UsageReport, User,
    UserExpenseReport, Vehicle, Vote,
};

pub fn user(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        email: user.email,
        roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
        created_at: user.created_at,
    }
}

pub fn group(group: Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        created_by: group.created_by,
        created_at: group.created_at,
    }
}

pub fn member(member: Member) -> MemberView {
    MemberView {
        group_id: member.group_id,
        user_id: member.user_id,
        percentage: member.percentage,
        joined_at: member.joined_at,
    }
}

pub fn vehicle(vehicle: Vehicle) -> VehicleView {
    VehicleView {
        id: vehicle.id,
        group_id: vehicle.group_id,
        vin: vehicle.vin,
        plate: vehicle.plate,
        model: vehicle.model,
        created_at: vehicle.created_at,
    }
}

pub fn booking(booking: Booking) -> BookingView {
    BookingView {
        id: booking.id,
        group_id: booking.group_id,
        vehicle_id: booking.vehicle_id,
        user_id: booking.user_id,
        start_time: booking.start_time,
        end_time: booking.end_time,
        status: booking.status.as_str().to_string(),
        created_at: booking.created_at,
    }
}

pub fn priority(priority: BookingPriority) -> PriorityView {
    PriorityView {
        group_id: priority.group_id,
        user_id: priority.user_id,
        ownership_percentage: priority.ownership_pct,
        user_usage_minutes: priority.user_usage_minutes,
        group_usage_minutes: priority.group_usage_minutes,
        priority_score: priority.score,
        priority_level: priority.level.as_str().to_string(),
    }
}

pub fn expense(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        group_id: expense.group_id,
        vehicle_id: expense.vehicle_id,
        created_by: expense.created_by,
        expense_type: expense.expense_type.as_str().to_string(),
        amount: expense.amount.to_string(),
        date: expense.date,
        description: expense.description,
        split_method: expense.split_method.as_str().to_string(),
        status: expense.status.as_str().to_string(),
        created_at: expense.created_at,
    }
}

pub fn share(share: ExpenseShare) -> ShareView {
    ShareView {
        id: share.id,
        expense_id: share.expense_id,
        user_id: share.user_id,
        amount: share.amount.to_string(),
        paid_amount: share.paid.to_string(),
        status: share.status.as_str().to_string(),
    }
}

pub fn payment(payment: Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        expense_share_id: payment.expense_share_id,
        user_id: payment.user_id,
        amount: payment.amount.to_string(),
        method: payment.method.as_str().to_string(),
        status: payment.status.as_str().to_string(),
        transaction_ref: payment.transaction_ref,
        notes: payment.notes,
        created_at: payment.created_at,
        completed_at: payment.completed_at,
    }
}

pub fn fund(fund: CommonFund) -> FundView {
    FundView {
        id: fund.id,
        group_id: fund.group_id,
        fund_type: fund.fund_type.as_str().to_string(),
        balance: fund.balance.to_string(),
        description: fund.description,
        created_at: fund.created_at,
    }
}

pub fn fund_transaction(tx: FundTransaction) -> FundTransactionView {
    FundTransactionView {
        id: tx.id,
        fund_id: tx.fund_id,
        kind: tx.kind.as_str().to_string(),
        amount: tx.amount.to_string(),
        occurred_at: tx.occurred_at,
        created_by: tx.created_by,
        description: tx.description,
        reference: tx.reference,
    }
}

pub fn vote(vote: Vote) -> VoteView {
    VoteView {
        id: vote.id,
        group_id: vote.group_id,
        topic: vote.topic,
        description: vote.description,
        created_by: vote.created_by,
        created_at: vote.created_at,
        deadline: vote.deadline,
        status: vote.status.as_str().to_string(),
        voting_method: vote.voting_method.as_str().to_string(),
        result: vote.result,
        options: vote
            .options
            .into_iter()
            .map(|o| OptionView {
                label: o.label,
                count: o.count,
            })
            .collect(),
    }
}

pub fn dispute(dispute: Dispute) -> DisputeView {
    DisputeView {
        id: dispute.id,
        group_id: dispute.group_id,
        created_by: dispute.created_by,
        title: dispute.title,
        description: dispute.description,
        category: dispute.category.as_str().to_string(),
        status: dispute.status.as_str().to_string(),
        related_booking_id: dispute.related_booking_id,
        related_expense_id: dispute.related_expense_id,
        created_at: dispute.created_at,
        resolved_at: dispute.resolved_at,
        resolved_by: dispute.resolved_by,
        resolution: dispute.resolution,
    }
}

pub fn contract(contract: EContract) -> ContractView {
    ContractView {
        id: contract.id,
        group_id: contract.group_id,
        contract_no: contract.contract_no,
        start_date: contract.start_date,
        end_date: contract.end_date,
        status: contract.status.as_str().to_string(),
        terms: contract.terms,
        document_url: contract.document_url,
        created_by: contract.created_by,
        created_at: contract.created_at,
        signed_at: contract.signed_at,
        signed_by: contract.signed_by,
    }
}

pub fn usage(history: UsageHistory) -> UsageView {
    UsageView {
        id: history.id,
        booking_id: history.booking_id,
        vehicle_id: history.vehicle_id,
        user_id: history.user_id,
        start_time: history.start_time,
        end_time: history.end_time,
        start_odometer: history.start_odometer,
        end_odometer: history.end_odometer,
        distance: history.distance,
        notes: history.notes,
        checked_in_by: history.checked_in_by,
        checked_in_at: history.checked_in_at,
        checked_out_by: history.checked_out_by,
        checked_out_at: history.checked_out_at,
        check_in_qr: history.check_in_qr,
        check_out_qr: history.check_out_qr,
    }
}

pub fn financial_report(report: FinancialReport) -> FinancialReportView {
    FinancialReportView {
        group_id: report.group_id,
        group_name: report.group_name,
        from: report.from,
        to: report.to,
        total_expenses: report.total.to_string(),
        expenses_by_type: report
            .by_type
            .into_iter()
            .map(|(expense_type, amount)| TypeTotal {
                expense_type: expense_type.as_str().to_string(),
                amount: amount.to_string(),
            })
            .collect(),
        expense_count: report.expense_count,
        paid_expenses: report.paid_count,
        pending_expenses: report.pending_count,
    }
}

pub fn user_report(report: UserExpenseReport) -> UserExpenseReportView {
    UserExpenseReportView {
        user_id: report.user_id,
        from: report.from,
        to: report.to,
        total_owed: report.total_owed.to_string(),
        total_paid: report.total_paid.to_string(),
        total_pending: report.total_pending.to_string(),
        expense_share_count: report.share_count,
        paid_count: report.paid_count,
        pending_count: report.pending_count,
    }
}

pub fn usage_report(report: UsageReport) -> UsageReportView {
    UsageReportView {
        group_id: report.group_id,
        group_name: report.group_name,
        group_usage_minutes: report.group_usage_minutes,
        members: report
            .members
            .into_iter()
            .map(|m| MemberUsageView {
                user_id: m.user_id,
                usage_minutes: m.usage_minutes,
                ownership_percentage: m.ownership_pct,
                usage_percentage: m.usage_pct,
                difference: m.difference,
                is_fair: m.is_fair,
            })
            .collect(),
    }
}

/// Converts every item of `items` with `f`.
pub fn list<T, V>(items: Vec<T>, f: fn(T) -> V) -> Vec<V> {
    items.into_iter().map(f).collect()
}
