//! Command structs for engine operations.
//!
//! These types group parameters for write operations with many optional
//! fields (expenses, votes, disputes, contracts, payments), keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    DisputeCategory, ExpenseType, FundType, MoneyCents, PaymentMethod, SplitMethod, VotingMethod,
};

/// Register a vehicle in a group.
#[derive(Clone, Debug)]
pub struct NewVehicleCmd {
    pub group_id: Uuid,
    pub vin: String,
    pub plate: String,
    pub model: String,
}

impl NewVehicleCmd {
    #[must_use]
    pub fn new(
        group_id: Uuid,
        vin: impl Into<String>,
        plate: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            group_id,
            vin: vin.into(),
            plate: plate.into(),
            model: model.into(),
        }
    }
}

/// Create an expense and split it across the group.
#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub group_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub expense_type: ExpenseType,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub split_method: SplitMethod,
}

impl NewExpenseCmd {
    #[must_use]
    pub fn new(
        group_id: Uuid,
        expense_type: ExpenseType,
        amount: MoneyCents,
        date: NaiveDate,
        split_method: SplitMethod,
    ) -> Self {
        Self {
            group_id,
            vehicle_id: None,
            expense_type,
            amount,
            date,
            description: None,
            split_method,
        }
    }

    #[must_use]
    pub fn vehicle_id(mut self, vehicle_id: Uuid) -> Self {
        self.vehicle_id = Some(vehicle_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Pay (part of) an expense share.
#[derive(Clone, Debug)]
pub struct PayShareCmd {
    pub expense_share_id: Uuid,
    pub amount: MoneyCents,
    pub method: PaymentMethod,
    pub notes: Option<String>,
}

impl PayShareCmd {
    #[must_use]
    pub fn new(expense_share_id: Uuid, amount: MoneyCents, method: PaymentMethod) -> Self {
        Self {
            expense_share_id,
            amount,
            method,
            notes: None,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Open a common fund for a group.
#[derive(Clone, Debug)]
pub struct NewFundCmd {
    pub group_id: Uuid,
    pub fund_type: FundType,
    pub description: Option<String>,
}

/// Move money in or out of a fund.
#[derive(Clone, Debug)]
pub struct FundMovementCmd {
    pub fund_id: Uuid,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl FundMovementCmd {
    #[must_use]
    pub fn new(fund_id: Uuid, amount: MoneyCents) -> Self {
        Self {
            fund_id,
            amount,
            description: None,
            reference: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Start a group vote.
#[derive(Clone, Debug)]
pub struct NewVoteCmd {
    pub group_id: Uuid,
    pub topic: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub voting_method: VotingMethod,
    /// Empty means YES/NO.
    pub options: Vec<String>,
}

impl NewVoteCmd {
    #[must_use]
    pub fn new(group_id: Uuid, topic: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            group_id,
            topic: topic.into(),
            description: None,
            deadline,
            voting_method: VotingMethod::SimpleMajority,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn voting_method(mut self, method: VotingMethod) -> Self {
        self.voting_method = method;
        self
    }

    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Raise a dispute within a group.
#[derive(Clone, Debug)]
pub struct NewDisputeCmd {
    pub group_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: DisputeCategory,
    pub related_booking_id: Option<Uuid>,
    pub related_expense_id: Option<Uuid>,
}

impl NewDisputeCmd {
    #[must_use]
    pub fn new(group_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            group_id,
            title: title.into(),
            description: description.into(),
            category: DisputeCategory::Other,
            related_booking_id: None,
            related_expense_id: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category: DisputeCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn related_booking(mut self, booking_id: Uuid) -> Self {
        self.related_booking_id = Some(booking_id);
        self
    }

    #[must_use]
    pub fn related_expense(mut self, expense_id: Uuid) -> Self {
        self.related_expense_id = Some(expense_id);
        self
    }
}

/// Draft a group contract.
#[derive(Clone, Debug)]
pub struct NewContractCmd {
    pub group_id: Uuid,
    pub contract_no: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub terms: Option<String>,
    pub document_url: Option<String>,
}
