//! Initial schema: accounts, groups, vehicles and their reservations.
//!
//! - `users` and `user_roles`: authentication and role assignment
//! - `co_ownership_groups`: groups of co-owners
//! - `ownership_shares`: percentage owned by each member of a group
//! - `vehicles`: cars owned by a group
//! - `bookings`: reservations of a vehicle by a member
//! - `usage_histories`: staff check-in/check-out of a booking

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum UserRoles {
    Table,
    UserId,
    Role,
}

#[derive(Iden)]
pub(crate) enum CoOwnershipGroups {
    Table,
    Id,
    Name,
    NameNorm,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum OwnershipShares {
    Table,
    GroupId,
    UserId,
    Percentage,
    JoinedAt,
}

#[derive(Iden)]
pub(crate) enum Vehicles {
    Table,
    Id,
    GroupId,
    Vin,
    Plate,
    ModelName,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum Bookings {
    Table,
    Id,
    GroupId,
    VehicleId,
    UserId,
    StartTime,
    EndTime,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum UsageHistories {
    Table,
    Id,
    BookingId,
    VehicleId,
    UserId,
    StartTime,
    EndTime,
    StartOdometer,
    EndOdometer,
    Distance,
    Notes,
    CheckedInBy,
    CheckedInAt,
    CheckedOutBy,
    CheckedOutAt,
    CheckInQr,
    CheckOutQr,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserRoles::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserRoles::Role).string().not_null())
                    .primary_key(Index::create().col(UserRoles::UserId).col(UserRoles::Role))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_roles-user_id")
                            .from(UserRoles::Table, UserRoles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Groups and ownership
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CoOwnershipGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CoOwnershipGroups::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CoOwnershipGroups::Name).string().not_null())
                    .col(
                        ColumnDef::new(CoOwnershipGroups::NameNorm)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CoOwnershipGroups::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(CoOwnershipGroups::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-co_ownership_groups-created_by")
                            .from(CoOwnershipGroups::Table, CoOwnershipGroups::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OwnershipShares::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OwnershipShares::GroupId).uuid().not_null())
                    .col(ColumnDef::new(OwnershipShares::UserId).uuid().not_null())
                    .col(ColumnDef::new(OwnershipShares::Percentage).double().not_null())
                    .col(
                        ColumnDef::new(OwnershipShares::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(OwnershipShares::GroupId)
                            .col(OwnershipShares::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ownership_shares-group_id")
                            .from(OwnershipShares::Table, OwnershipShares::GroupId)
                            .to(CoOwnershipGroups::Table, CoOwnershipGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ownership_shares-user_id")
                            .from(OwnershipShares::Table, OwnershipShares::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ownership_shares-user_id")
                    .table(OwnershipShares::Table)
                    .col(OwnershipShares::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Vehicles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vehicles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Vehicles::GroupId).uuid().not_null())
                    .col(ColumnDef::new(Vehicles::Vin).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Vehicles::Plate)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Vehicles::ModelName).string().not_null())
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vehicles-group_id")
                            .from(Vehicles::Table, Vehicles::GroupId)
                            .to(CoOwnershipGroups::Table, CoOwnershipGroups::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Bookings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::GroupId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::VehicleId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Bookings::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::Status).string().not_null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-group_id")
                            .from(Bookings::Table, Bookings::GroupId)
                            .to(CoOwnershipGroups::Table, CoOwnershipGroups::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-vehicle_id")
                            .from(Bookings::Table, Bookings::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-user_id")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-vehicle_id-start_time")
                    .table(Bookings::Table)
                    .col(Bookings::VehicleId)
                    .col(Bookings::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-user_id")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Usage histories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UsageHistories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageHistories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UsageHistories::BookingId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UsageHistories::VehicleId).uuid().not_null())
                    .col(ColumnDef::new(UsageHistories::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UsageHistories::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsageHistories::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsageHistories::StartOdometer)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UsageHistories::EndOdometer).integer())
                    .col(ColumnDef::new(UsageHistories::Distance).integer())
                    .col(ColumnDef::new(UsageHistories::Notes).string())
                    .col(ColumnDef::new(UsageHistories::CheckedInBy).uuid().not_null())
                    .col(
                        ColumnDef::new(UsageHistories::CheckedInAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UsageHistories::CheckedOutBy).uuid())
                    .col(ColumnDef::new(UsageHistories::CheckedOutAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UsageHistories::CheckInQr).string().not_null())
                    .col(ColumnDef::new(UsageHistories::CheckOutQr).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-usage_histories-booking_id")
                            .from(UsageHistories::Table, UsageHistories::BookingId)
                            .to(Bookings::Table, Bookings::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-usage_histories-vehicle_id")
                            .from(UsageHistories::Table, UsageHistories::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-usage_histories-user_id")
                    .table(UsageHistories::Table)
                    .col(UsageHistories::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageHistories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OwnershipShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CoOwnershipGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
