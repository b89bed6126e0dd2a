//! Initial migration: members, characters and activities.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_members(manager).await?;
        self.create_characters(manager).await?;
        self.create_activities(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Characters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_members(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::MembershipId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Members::MembershipType)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Members::DisplayName).string().not_null())
                    .col(ColumnDef::new(Members::IconPath).text().null())
                    .col(
                        ColumnDef::new(Members::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Members::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_characters(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Characters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Characters::CharacterId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Characters::MembershipId)
                            .string()
                            .not_null(),
                    )
                    // Attributes
                    .col(ColumnDef::new(Characters::Race).integer().not_null())
                    .col(ColumnDef::new(Characters::Gender).integer().not_null())
                    .col(ColumnDef::new(Characters::Class).integer().not_null())
                    .col(
                        ColumnDef::new(Characters::DateLastPlayed)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // Watermark
                    .col(
                        ColumnDef::new(Characters::LastRetrievedActivity)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Characters::LastRetrievedDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Tracking
                    .col(
                        ColumnDef::new(Characters::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Characters::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_characters_member")
                            .from(Characters::Table, Characters::MembershipId)
                            .to(Members::Table, Members::MembershipId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_characters_membership_id")
                    .table(Characters::Table)
                    .col(Characters::MembershipId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn create_activities(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::InstanceId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Activities::Period)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Activities::Mode).integer().not_null())
                    .col(
                        ColumnDef::new(Activities::DirectorActivityHash)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activities::ReferenceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activities::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Activities::EntryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Activities::Participants)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(ColumnDef::new(Activities::Report).json().not_null())
                    .col(
                        ColumnDef::new(Activities::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_period")
                    .table(Activities::Table)
                    .col(Activities::Period)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_entry_count")
                    .table(Activities::Table)
                    .col(Activities::EntryCount)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Members {
    Table,
    MembershipId,
    MembershipType,
    DisplayName,
    IconPath,
    Enabled,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Characters {
    Table,
    CharacterId,
    MembershipId,
    Race,
    Gender,
    Class,
    DateLastPlayed,
    LastRetrievedActivity,
    LastRetrievedDate,
    Enabled,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    InstanceId,
    Period,
    Mode,
    DirectorActivityHash,
    ReferenceId,
    IsPrivate,
    EntryCount,
    Participants,
    Report,
    SyncedAt,
}
