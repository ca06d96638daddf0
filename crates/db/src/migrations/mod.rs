//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20251001_000001_create_organizer_table;
mod m20251001_000002_create_event_table;
mod m20251001_000003_create_ticket_tier_table;
mod m20251001_000004_create_registration_table;
mod m20251001_000005_create_invoice_tables;
mod m20251001_000006_create_contact_message_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_organizer_table::Migration),
            Box::new(m20251001_000002_create_event_table::Migration),
            Box::new(m20251001_000003_create_ticket_tier_table::Migration),
            Box::new(m20251001_000004_create_registration_table::Migration),
            Box::new(m20251001_000005_create_invoice_tables::Migration),
            Box::new(m20251001_000006_create_contact_message_table::Migration),
        ]
    }
}
