//! Money tables: expenses split into shares, payments, and common funds with
//! their ledger.

use sea_orm_migration::prelude::*;

use crate::m20260101_000000_init::{CoOwnershipGroups, Users, Vehicles};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Expenses {
    Table,
    Id,
    GroupId,
    VehicleId,
    CreatedBy,
    ExpenseType,
    AmountMinor,
    ExpenseDate,
    Description,
    SplitMethod,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseShares {
    Table,
    Id,
    ExpenseId,
    UserId,
    AmountMinor,
    PaidMinor,
    Status,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    ExpenseShareId,
    UserId,
    AmountMinor,
    Method,
    Status,
    TransactionRef,
    Notes,
    CreatedAt,
    CompletedAt,
}

#[derive(Iden)]
enum CommonFunds {
    Table,
    Id,
    GroupId,
    FundType,
    BalanceMinor,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum FundTransactions {
    Table,
    Id,
    FundId,
    Kind,
    AmountMinor,
    OccurredAt,
    CreatedBy,
    Description,
    Reference,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::GroupId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::VehicleId).uuid())
                    .col(ColumnDef::new(Expenses::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Expenses::ExpenseType).string().not_null())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                    .col(ColumnDef::new(Expenses::Description).string())
                    .col(ColumnDef::new(Expenses::SplitMethod).string().not_null())
                    .col(ColumnDef::new(Expenses::Status).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-group_id")
                            .from(Expenses::Table, Expenses::GroupId)
                            .to(CoOwnershipGroups::Table, CoOwnershipGroups::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-vehicle_id")
                            .from(Expenses::Table, Expenses::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-created_by")
                            .from(Expenses::Table, Expenses::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-group_id-expense_date")
                    .table(Expenses::Table)
                    .col(Expenses::GroupId)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseShares::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseShares::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseShares::ExpenseId).uuid().not_null())
                    .col(ColumnDef::new(ExpenseShares::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExpenseShares::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseShares::PaidMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ExpenseShares::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_shares-expense_id")
                            .from(ExpenseShares::Table, ExpenseShares::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_shares-user_id")
                            .from(ExpenseShares::Table, ExpenseShares::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_shares-expense_id-user_id-unique")
                    .table(ExpenseShares::Table)
                    .col(ExpenseShares::ExpenseId)
                    .col(ExpenseShares::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_shares-user_id")
                    .table(ExpenseShares::Table)
                    .col(ExpenseShares::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payments::ExpenseShareId).uuid().not_null())
                    .col(ColumnDef::new(Payments::UserId).uuid().not_null())
                    .col(ColumnDef::new(Payments::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .col(ColumnDef::new(Payments::Status).string().not_null())
                    .col(
                        ColumnDef::new(Payments::TransactionRef)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payments::Notes).string())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::CompletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-expense_share_id")
                            .from(Payments::Table, Payments::ExpenseShareId)
                            .to(ExpenseShares::Table, ExpenseShares::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-user_id")
                            .from(Payments::Table, Payments::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommonFunds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommonFunds::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommonFunds::GroupId).uuid().not_null())
                    .col(ColumnDef::new(CommonFunds::FundType).string().not_null())
                    .col(
                        ColumnDef::new(CommonFunds::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CommonFunds::Description).string())
                    .col(
                        ColumnDef::new(CommonFunds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-common_funds-group_id")
                            .from(CommonFunds::Table, CommonFunds::GroupId)
                            .to(CoOwnershipGroups::Table, CoOwnershipGroups::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FundTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FundTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FundTransactions::FundId).uuid().not_null())
                    .col(ColumnDef::new(FundTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(FundTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundTransactions::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FundTransactions::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(FundTransactions::Description).string())
                    .col(ColumnDef::new(FundTransactions::Reference).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fund_transactions-fund_id")
                            .from(FundTransactions::Table, FundTransactions::FundId)
                            .to(CommonFunds::Table, CommonFunds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fund_transactions-created_by")
                            .from(FundTransactions::Table, FundTransactions::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fund_transactions-fund_id-occurred_at")
                    .table(FundTransactions::Table)
                    .col(FundTransactions::FundId)
                    .col(FundTransactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FundTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommonFunds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        Ok(())
    }
}
