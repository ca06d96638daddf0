//! Create `organizer` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizer::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Organizer::Email)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Organizer::PasswordHash).string_len(256).not_null())
                    .col(ColumnDef::new(Organizer::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Organizer::Role)
                            .string_len(16)
                            .not_null()
                            .default("ORGANIZER"),
                    )
                    .col(ColumnDef::new(Organizer::PhotoUrl).string_len(1024))
                    .col(ColumnDef::new(Organizer::PasswordResetToken).string_len(64))
                    .col(ColumnDef::new(Organizer::PasswordResetExpires).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Organizer::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Organizer::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organizer_password_reset_token")
                    .table(Organizer::Table)
                    .col(Organizer::PasswordResetToken)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organizer::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Organizer {
    Table,
    Id,
    Email,
    PasswordHash,
    Name,
    Role,
    PhotoUrl,
    PasswordResetToken,
    PasswordResetExpires,
    CreatedAt,
    UpdatedAt,
}
