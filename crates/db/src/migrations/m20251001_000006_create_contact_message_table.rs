//! Create `contact_message` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContactMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContactMessage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContactMessage::Name).string_len(128).not_null())
                    .col(ColumnDef::new(ContactMessage::Email).string_len(256).not_null())
                    .col(ColumnDef::new(ContactMessage::Subject).string_len(256).not_null())
                    .col(ColumnDef::new(ContactMessage::Message).text().not_null())
                    .col(
                        ColumnDef::new(ContactMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contact_message_created_at")
                    .table(ContactMessage::Table)
                    .col(ContactMessage::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactMessage::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContactMessage {
    Table,
    Id,
    Name,
    Email,
    Subject,
    Message,
    CreatedAt,
}
