//! Invoice entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a paid registration, numbered `INV-<year>-<seq>`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub invoice_number: String,

    #[sea_orm(indexed)]
    pub registration_id: String,

    pub user_name: String,
    pub user_email: String,
    pub event_title: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_amount: i64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::registration::Entity",
        from = "Column::RegistrationId",
        to = "super::registration::Column::Id",
        on_delete = "Cascade"
    )]
    Registration,
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registration.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
