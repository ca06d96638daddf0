//! Organizer entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An account that creates and manages events.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Login email, stored lowercase.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: String,

    /// Role claim placed in access tokens.
    pub role: String,

    #[sea_orm(nullable)]
    pub photo_url: Option<String>,

    #[sea_orm(nullable, indexed)]
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,

    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub password_reset_expires: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// Default role for self-registered organizers.
pub const ROLE_ORGANIZER: &str = "ORGANIZER";

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
