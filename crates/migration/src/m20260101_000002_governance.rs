//! Group governance: votes with their options and ballots, disputes and
//! e-contracts.

use sea_orm_migration::prelude::*;

use crate::{
    m20260101_000000_init::{Bookings, CoOwnershipGroups, Users},
    m20260101_000001_finance::Expenses,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Votes {
    Table,
    Id,
    GroupId,
    Topic,
    Description,
    CreatedBy,
    CreatedAt,
    Deadline,
    Status,
    VotingMethod,
    Result,
}

#[derive(Iden)]
enum VoteOptions {
    Table,
    Id,
    VoteId,
    Label,
    Position,
    Count,
}

#[derive(Iden)]
enum UserVotes {
    Table,
    VoteId,
    UserId,
    Choice,
    VotedAt,
}

#[derive(Iden)]
enum Disputes {
    Table,
    Id,
    GroupId,
    CreatedBy,
    Title,
    Description,
    Category,
    Status,
    RelatedBookingId,
    RelatedExpenseId,
    CreatedAt,
    ResolvedAt,
    ResolvedBy,
    Resolution,
}

#[derive(Iden)]
enum Econtracts {
    Table,
    Id,
    GroupId,
    ContractNo,
    StartDate,
    EndDate,
    Status,
    Terms,
    DocumentUrl,
    CreatedBy,
    CreatedAt,
    SignedAt,
    SignedBy,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // Votes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Votes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Votes::GroupId).uuid().not_null())
                    .col(ColumnDef::new(Votes::Topic).string().not_null())
                    .col(ColumnDef::new(Votes::Description).string())
                    .col(ColumnDef::new(Votes::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Votes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Votes::Deadline)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Votes::Status).string().not_null())
                    .col(ColumnDef::new(Votes::VotingMethod).string().not_null())
                    .col(ColumnDef::new(Votes::Result).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-votes-group_id")
                            .from(Votes::Table, Votes::GroupId)
                            .to(CoOwnershipGroups::Table, CoOwnershipGroups::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-votes-created_by")
                            .from(Votes::Table, Votes::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VoteOptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoteOptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VoteOptions::VoteId).uuid().not_null())
                    .col(ColumnDef::new(VoteOptions::Label).string().not_null())
                    .col(ColumnDef::new(VoteOptions::Position).integer().not_null())
                    .col(
                        ColumnDef::new(VoteOptions::Count)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vote_options-vote_id")
                            .from(VoteOptions::Table, VoteOptions::VoteId)
                            .to(Votes::Table, Votes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vote_options-vote_id-label-unique")
                    .table(VoteOptions::Table)
                    .col(VoteOptions::VoteId)
                    .col(VoteOptions::Label)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserVotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserVotes::VoteId).uuid().not_null())
                    .col(ColumnDef::new(UserVotes::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserVotes::Choice).string().not_null())
                    .col(
                        ColumnDef::new(UserVotes::VotedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(Index::create().col(UserVotes::VoteId).col(UserVotes::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_votes-vote_id")
                            .from(UserVotes::Table, UserVotes::VoteId)
                            .to(Votes::Table, Votes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_votes-user_id")
                            .from(UserVotes::Table, UserVotes::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // Disputes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Disputes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Disputes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Disputes::GroupId).uuid().not_null())
                    .col(ColumnDef::new(Disputes::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Disputes::Title).string().not_null())
                    .col(ColumnDef::new(Disputes::Description).text().not_null())
                    .col(ColumnDef::new(Disputes::Category).string().not_null())
                    .col(ColumnDef::new(Disputes::Status).string().not_null())
                    .col(ColumnDef::new(Disputes::RelatedBookingId).uuid())
                    .col(ColumnDef::new(Disputes::RelatedExpenseId).uuid())
                    .col(
                        ColumnDef::new(Disputes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Disputes::ResolvedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Disputes::ResolvedBy).uuid())
                    .col(ColumnDef::new(Disputes::Resolution).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-disputes-group_id")
                            .from(Disputes::Table, Disputes::GroupId)
                            .to(CoOwnershipGroups::Table, CoOwnershipGroups::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-disputes-related_booking_id")
                            .from(Disputes::Table, Disputes::RelatedBookingId)
                            .to(Bookings::Table, Bookings::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-disputes-related_expense_id")
                            .from(Disputes::Table, Disputes::RelatedExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-disputes-status")
                    .table(Disputes::Table)
                    .col(Disputes::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // E-contracts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Econtracts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Econtracts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Econtracts::GroupId).uuid().not_null())
                    .col(
                        ColumnDef::new(Econtracts::ContractNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Econtracts::StartDate).date().not_null())
                    .col(ColumnDef::new(Econtracts::EndDate).date().not_null())
                    .col(ColumnDef::new(Econtracts::Status).string().not_null())
                    .col(ColumnDef::new(Econtracts::Terms).text())
                    .col(ColumnDef::new(Econtracts::DocumentUrl).string())
                    .col(ColumnDef::new(Econtracts::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Econtracts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Econtracts::SignedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Econtracts::SignedBy).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-econtracts-group_id")
                            .from(Econtracts::Table, Econtracts::GroupId)
                            .to(CoOwnershipGroups::Table, CoOwnershipGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Econtracts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Disputes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserVotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VoteOptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await?;
        Ok(())
    }
}
