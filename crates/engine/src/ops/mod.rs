use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod bookings;
mod contracts;
mod disputes;
mod expenses;
mod funds;
mod groups;
mod payments;
mod reports;
mod usage;
mod users;
mod vehicles;
mod votes;

pub use bookings::BookingPriority;
pub use expenses::ExpenseWithShares;
pub use reports::{FinancialReport, MemberUsage, UsageReport, UserExpenseReport};

/// Runs `$body` against a fresh transaction `$tx`; commits only when it yields `Ok`.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Clock used by the engine. Tests pin it to move "now" around.
type Clock = fn() -> DateTime<Utc>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    clock: Clock,
}

impl Engine {
    /// Starts an [`EngineBuilder`].
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

/// Wires the database connection and the clock into an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    clock: Option<Clock>,
}

impl EngineBuilder {
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the wall clock.
    pub fn clock(mut self, clock: fn() -> DateTime<Utc>) -> EngineBuilder {
        self.clock = Some(clock);
        self
    }

    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            clock: self.clock.unwrap_or(Utc::now),
        })
    }
}
