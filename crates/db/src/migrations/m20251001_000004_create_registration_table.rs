//! Create `registration` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Registration::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Registration::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Registration::EventId).string_len(32).not_null())
                    .col(ColumnDef::new(Registration::UserName).string_len(128).not_null())
                    .col(ColumnDef::new(Registration::UserEmail).string_len(256).not_null())
                    .col(ColumnDef::new(Registration::UserPhone).string_len(32).not_null())
                    .col(ColumnDef::new(Registration::TicketType).string_len(16).not_null())
                    .col(ColumnDef::new(Registration::TicketPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(Registration::Quantity)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(Registration::Quantity).gte(1)),
                    )
                    .col(
                        ColumnDef::new(Registration::Status)
                            .string_len(16)
                            .not_null()
                            .default("PENDING_OTP"),
                    )
                    .col(
                        ColumnDef::new(Registration::PaymentStatus)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Registration::Otp).string_len(8))
                    .col(ColumnDef::new(Registration::OtpExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Registration::OtpVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Registration::GatewayOrderId).string_len(64))
                    .col(ColumnDef::new(Registration::GatewayPaymentId).string_len(64))
                    .col(ColumnDef::new(Registration::QrCode).text())
                    .col(
                        ColumnDef::new(Registration::RegistrationNumber)
                            .string_len(32)
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Registration::TicketSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Registration::ReminderCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Registration::LastReminderAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Registration::ExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Registration::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Registration::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registration_event")
                            .from(Registration::Table, Registration::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Duplicate-registration lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_registration_event_email")
                    .table(Registration::Table)
                    .col(Registration::EventId)
                    .col(Registration::UserEmail)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_registration_event_phone")
                    .table(Registration::Table)
                    .col(Registration::EventId)
                    .col(Registration::UserPhone)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_registration_user_phone")
                    .table(Registration::Table)
                    .col(Registration::UserPhone)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_registration_gateway_order_id")
                    .table(Registration::Table)
                    .col(Registration::GatewayOrderId)
                    .to_owned(),
            )
            .await?;

        // Expiry sweep and reminder scan
        manager
            .create_index(
                Index::create()
                    .name("idx_registration_status_expires_at")
                    .table(Registration::Table)
                    .col(Registration::Status)
                    .col(Registration::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Registration::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Registration {
    Table,
    Id,
    EventId,
    UserName,
    UserEmail,
    UserPhone,
    TicketType,
    TicketPrice,
    Quantity,
    Status,
    PaymentStatus,
    Otp,
    OtpExpiresAt,
    OtpVerified,
    GatewayOrderId,
    GatewayPaymentId,
    QrCode,
    RegistrationNumber,
    TicketSent,
    ReminderCount,
    LastReminderAt,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}
