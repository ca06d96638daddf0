//! Create `invoice` and `invoice_counter` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InvoiceCounter::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvoiceCounter::Year)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InvoiceCounter::Seq)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Invoice::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoice::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Invoice::InvoiceNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Invoice::RegistrationId).string_len(32).not_null())
                    .col(ColumnDef::new(Invoice::UserName).string_len(128).not_null())
                    .col(ColumnDef::new(Invoice::UserEmail).string_len(256).not_null())
                    .col(ColumnDef::new(Invoice::EventTitle).string_len(256).not_null())
                    .col(ColumnDef::new(Invoice::Quantity).integer().not_null())
                    .col(ColumnDef::new(Invoice::UnitPrice).big_integer().not_null())
                    .col(ColumnDef::new(Invoice::TotalAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Invoice::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_registration")
                            .from(Invoice::Table, Invoice::RegistrationId)
                            .to(Registration::Table, Registration::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_registration_id")
                    .table(Invoice::Table)
                    .col(Invoice::RegistrationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoice::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvoiceCounter::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invoice {
    Table,
    Id,
    InvoiceNumber,
    RegistrationId,
    UserName,
    UserEmail,
    EventTitle,
    Quantity,
    UnitPrice,
    TotalAmount,
    CreatedAt,
}

#[derive(Iden)]
enum InvoiceCounter {
    Table,
    Year,
    Seq,
}

#[derive(Iden)]
enum Registration {
    Table,
    Id,
}
