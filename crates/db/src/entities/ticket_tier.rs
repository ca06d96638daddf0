//! Ticket tier entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of ticket. Each kind appears at most once per event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketType {
    #[sea_orm(string_value = "FREE")]
    Free,
    #[sea_orm(string_value = "EARLY_BIRD")]
    EarlyBird,
    #[sea_orm(string_value = "REGULAR")]
    Regular,
    #[sea_orm(string_value = "VIP")]
    Vip,
}

impl TicketType {
    /// Wire name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::EarlyBird => "EARLY_BIRD",
            Self::Regular => "REGULAR",
            Self::Vip => "VIP",
        }
    }
}

/// A priced ticket category of an event with its remaining stock.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_tier")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub event_id: String,

    pub tier_type: TicketType,

    /// Display name, e.g. "Early Bird Pass".
    pub name: String,

    /// Unit price in whole currency units. Zero for free tiers.
    pub price: i64,

    /// Tickets issued for this tier.
    pub quantity: i32,

    /// Tickets still available. Only ever lowered by a conditional update.
    pub available: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Display order within the event.
    #[sea_orm(default_value = 0)]
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
