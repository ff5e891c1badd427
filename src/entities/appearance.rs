//! Appearance entity - A snapshot of a character's body.

use super::enums::AppearanceKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Appearance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appearances")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Character the appearance belongs to
    pub character_id: i64,
    /// Default or current
    pub kind: AppearanceKind,
}

/// Defines relationships between Appearance and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each appearance belongs to one character
    #[sea_orm(
        belongs_to = "super::character::Entity",
        from = "Column::CharacterId",
        to = "super::character::Column::Id"
    )]
    Character,
    /// One appearance has many body-part components
    #[sea_orm(has_many = "super::appearance_component::Entity")]
    Components,
}

impl Related<super::character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Character.def()
    }
}

impl Related<super::appearance_component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Components.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
