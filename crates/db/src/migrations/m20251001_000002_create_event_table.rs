//! Create `event` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Event::OrganizerId).string_len(32).not_null())
                    .col(ColumnDef::new(Event::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Event::Description).text().not_null())
                    .col(ColumnDef::new(Event::StartDate).date().not_null())
                    .col(ColumnDef::new(Event::EndDate).date().not_null())
                    .col(ColumnDef::new(Event::StartTime).string_len(16).not_null())
                    .col(ColumnDef::new(Event::EndTime).string_len(16).not_null())
                    .col(ColumnDef::new(Event::Location).string_len(512).not_null())
                    .col(ColumnDef::new(Event::City).string_len(128).not_null())
                    .col(ColumnDef::new(Event::Category).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Event::MediaUrls)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Event::Capacity)
                            .integer()
                            .not_null()
                            .check(Expr::col(Event::Capacity).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Event::Status)
                            .string_len(16)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(
                        ColumnDef::new(Event::TotalRegistrations)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Event::TotalRevenue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Event::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizer")
                            .from(Event::Table, Event::OrganizerId)
                            .to(Organizer::Table, Organizer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_organizer_id")
                    .table(Event::Table)
                    .col(Event::OrganizerId)
                    .to_owned(),
            )
            .await?;

        // Public listing: filter by status, order by start date
        manager
            .create_index(
                Index::create()
                    .name("idx_event_status_start_date")
                    .table(Event::Table)
                    .col(Event::Status)
                    .col(Event::StartDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_city")
                    .table(Event::Table)
                    .col(Event::City)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_category")
                    .table(Event::Table)
                    .col(Event::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
    OrganizerId,
    Title,
    Description,
    StartDate,
    EndDate,
    StartTime,
    EndTime,
    Location,
    City,
    Category,
    MediaUrls,
    Capacity,
    Status,
    TotalRegistrations,
    TotalRevenue,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Organizer {
    Table,
    Id,
}
