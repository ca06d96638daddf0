//! Event entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication lifecycle of an event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Created but not visible to attendees.
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Listed and open for registration.
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
    /// Taken down by the organizer.
    #[sea_orm(string_value = "UNPUBLISHED")]
    Unpublished,
    #[sea_orm(string_value = "ONGOING")]
    Ongoing,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

/// An event with dated sessions and ticket tiers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Organizer who owns this event.
    #[sea_orm(indexed)]
    pub organizer_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub start_date: Date,
    pub end_date: Date,

    /// Free-form start time as entered by the organizer (e.g. `18:30`).
    pub start_time: String,
    pub end_time: String,

    pub location: String,

    #[sea_orm(indexed)]
    pub city: String,

    #[sea_orm(indexed)]
    pub category: String,

    /// Image/video URLs (JSON array of strings).
    #[sea_orm(column_type = "JsonBinary")]
    pub media_urls: Json,

    /// Total seats across all tiers.
    pub capacity: i32,

    #[sea_orm(indexed)]
    pub status: EventStatus,

    /// Tickets sold (sum of completed registration quantities).
    #[sea_orm(default_value = 0)]
    pub total_registrations: i32,

    /// Paid revenue in whole currency units.
    #[sea_orm(default_value = 0)]
    pub total_revenue: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizer::Entity",
        from = "Column::OrganizerId",
        to = "super::organizer::Column::Id",
        on_delete = "Cascade"
    )]
    Organizer,
    #[sea_orm(has_many = "super::ticket_tier::Entity")]
    TicketTiers,
    #[sea_orm(has_many = "super::registration::Entity")]
    Registrations,
}

impl Related<super::organizer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl Related<super::ticket_tier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketTiers.def()
    }
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
