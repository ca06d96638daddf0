//! Create `ticket_tier` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketTier::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketTier::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketTier::EventId).string_len(32).not_null())
                    .col(ColumnDef::new(TicketTier::TierType).string_len(16).not_null())
                    .col(ColumnDef::new(TicketTier::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(TicketTier::Price)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(TicketTier::Price).gte(0)),
                    )
                    .col(
                        ColumnDef::new(TicketTier::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(TicketTier::Quantity).gte(0)),
                    )
                    // Stock can never go negative, whatever the caller does
                    .col(
                        ColumnDef::new(TicketTier::Available)
                            .integer()
                            .not_null()
                            .check(Expr::col(TicketTier::Available).gte(0)),
                    )
                    .col(ColumnDef::new(TicketTier::Description).text())
                    .col(
                        ColumnDef::new(TicketTier::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_tier_event")
                            .from(TicketTier::Table, TicketTier::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_tier_event_type")
                    .table(TicketTier::Table)
                    .col(TicketTier::EventId)
                    .col(TicketTier::TierType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketTier::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TicketTier {
    Table,
    Id,
    EventId,
    TierType,
    Name,
    Price,
    Quantity,
    Available,
    Description,
    Position,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}
